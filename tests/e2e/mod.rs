// End-to-end tests for the TTS Studio Backend API
//
// Each test boots the real axum router on an ephemeral port. The remote
// speech endpoint is replaced by a scripted double and every throttle or
// backoff sleep returns immediately, so tests exercise the full
// chunking/batching/retry pipeline without network access or wall-clock waits.

mod helpers;
mod test_health;
mod test_tts;

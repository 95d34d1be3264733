//! End-to-end test support for Kioku
//!
//! - [`harness`]: isolated SQLite databases and seeded quiz engines
//! - [`mocks`]: realistic kana and kanji fixtures

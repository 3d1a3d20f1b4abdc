#![no_main]

//! Fuzz target for ClientHello parsing and version negotiation.
//!
//! The receive path is the primary attacker surface: every length field in
//! the message is peer-controlled and must never cause an over-read or a
//! panic, only a clean MalformedMessage.
//!
//! ClientHello format:
//! - legacy_version: 2 bytes
//! - random: 32 bytes
//! - session_id: 1 byte length + up to 32 bytes
//! - cipher_suites: 2 byte length + entries
//! - compression_methods: 1 byte length + entries
//! - extensions: optional 2 byte block length + entries

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use verneg::{Config, Mode, Session};

fuzz_target!(|data: &[u8]| {
    // TLS 1.3 enabled: the supported_versions payload gets interpreted.
    let config = Arc::new(
        Config::builder()
            .policy("default_tls13")
            .enable_tls13(true)
            .build()
            .expect("config"),
    );
    let mut session = Session::new(config, Mode::Server);
    let _ = session.handle_client_hello(data);

    // TLS 1.3 disabled: same bytes, extension treated as unrecognized data.
    let config = Arc::new(Config::default());
    let mut session = Session::new(config, Mode::Server);
    let _ = session.handle_client_hello(data);

    // If input is long enough, also test with a plausible hello prefix so
    // the fuzzer reaches past the fixed header more often.
    if !data.is_empty() {
        let mut hello = Vec::with_capacity(39 + data.len());
        hello.extend_from_slice(&[0x03, 0x03]); // TLS 1.2 legacy version
        hello.extend_from_slice(&[0xAB; 32]); // random
        hello.push(0); // empty session id
        hello.extend_from_slice(&[0x00, 0x02, 0xC0, 0x2F]); // one cipher suite
        hello.extend_from_slice(&[0x01, 0x00]); // null compression
        hello.extend_from_slice(data); // fuzzed extension block

        let config = Arc::new(
            Config::builder()
                .policy("default_tls13")
                .enable_tls13(true)
                .build()
                .expect("config"),
        );
        let mut session = Session::new(config, Mode::Server);
        let _ = session.handle_client_hello(&hello);
    }
});

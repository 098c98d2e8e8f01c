//! Integration tests for the AWG70000-series drivers against the mock transport.

use rf_instruments::adapters::MockTransport;
use rf_instruments::instrument::{Awg70000A, AwgOptions, TektronixAwg70001B};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const IDN_REPLY: &str = "TEKTRONIX,AWG70001B,B010203,FV:5.3.0367.0";

#[tokio::test]
async fn test_70001b_fixes_channel_count_to_two() {
    let transport = MockTransport::new();
    transport.stub("*IDN?", IDN_REPLY);

    let awg = TektronixAwg70001B::connect("awg", Arc::new(transport.clone()), AwgOptions::default())
        .await
        .unwrap();

    assert_eq!(awg.num_channels(), 2);
    assert_eq!(awg.name(), "awg");
    // Connect touches the wire only for the identification banner.
    assert_eq!(transport.sent(), vec!["*IDN?"]);
}

#[tokio::test]
async fn test_default_timeout_is_ten_seconds() {
    let transport = MockTransport::new();
    transport.stub("*IDN?", IDN_REPLY);

    let awg = TektronixAwg70001B::connect("awg", Arc::new(transport), AwgOptions::default())
        .await
        .unwrap();

    assert_eq!(awg.timeout(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_options_forwarded_to_base() {
    let transport = MockTransport::new();
    transport.stub("*IDN?", IDN_REPLY);

    let mut extra = HashMap::new();
    extra.insert("io_protocol".to_string(), toml::Value::from("hislip"));
    let options = AwgOptions {
        timeout: Duration::from_secs(2),
        extra,
    };

    let awg = TektronixAwg70001B::connect("awg", Arc::new(transport), options)
        .await
        .unwrap();

    assert_eq!(awg.timeout(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_base_rejects_unsupported_channel_counts() {
    for num_channels in [0, 3] {
        let transport = MockTransport::new();
        transport.stub("*IDN?", IDN_REPLY);

        let result = Awg70000A::connect(
            "awg",
            Arc::new(transport.clone()),
            num_channels,
            AwgOptions::default(),
        )
        .await;

        assert!(result.is_err());
        // Rejected before any wire traffic.
        assert!(transport.sent().is_empty());
    }
}

#[tokio::test]
async fn test_identify_and_reset_forward_to_base() {
    let transport = MockTransport::new();
    transport.stub("*IDN?", IDN_REPLY);

    let awg = TektronixAwg70001B::connect("awg", Arc::new(transport.clone()), AwgOptions::default())
        .await
        .unwrap();

    let identity = awg.identify().await.unwrap();
    assert_eq!(identity.vendor, "TEKTRONIX");
    assert_eq!(identity.model, "AWG70001B");

    transport.clear_sent();
    awg.reset().await.unwrap();
    assert_eq!(transport.sent(), vec!["*RST"]);
}

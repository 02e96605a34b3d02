use std::str::FromStr;

use fleetrec::config::DEFAULT_PORT;
use fleetrec::controller::endpoint::AgentEndpoint;

#[test]
fn bare_host_gets_default_port() {
    let endpoint = AgentEndpoint::from_str("192.168.1.20").expect("parse");
    assert_eq!(endpoint.host, "192.168.1.20");
    assert_eq!(endpoint.port, DEFAULT_PORT);
}

#[test]
fn explicit_port_is_honored() {
    let endpoint = AgentEndpoint::from_str("studio-pc:6001").expect("parse");
    assert_eq!(endpoint.host, "studio-pc");
    assert_eq!(endpoint.port, 6001);
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let endpoint = AgentEndpoint::from_str("  10.0.0.5:5001 ").expect("parse");
    assert_eq!(endpoint.host, "10.0.0.5");
    assert_eq!(endpoint.port, 5001);
}

#[test]
fn invalid_port_is_rejected() {
    assert!(AgentEndpoint::from_str("host:99999").is_err());
    assert!(AgentEndpoint::from_str("host:abc").is_err());
}

#[test]
fn empty_input_is_rejected() {
    assert!(AgentEndpoint::from_str("").is_err());
    assert!(AgentEndpoint::from_str("   ").is_err());
    assert!(AgentEndpoint::from_str(":5001").is_err());
}

#[test]
fn display_matches_host_port_form() {
    let endpoint = AgentEndpoint::new("10.1.2.3", 5001);
    assert_eq!(endpoint.to_string(), "10.1.2.3:5001");

    let reparsed = AgentEndpoint::from_str(&endpoint.to_string()).expect("reparse");
    assert_eq!(reparsed, endpoint);
}

use super::*;

#[test]
fn test_source_kind_round_trips_through_config_name() {
    for kind in SourceKind::ALL {
        assert_eq!(kind.as_str().parse::<SourceKind>(), Ok(kind));
    }
}

#[test]
fn test_unknown_source_name_is_rejected() {
    let err = "Gitea".parse::<SourceKind>().unwrap_err();
    assert_eq!(err, UnknownSource("Gitea".to_string()));
    assert!(err.to_string().contains("Gitea"));
}

#[test]
fn test_source_names_are_case_sensitive() {
    assert!("github".parse::<SourceKind>().is_err());
}

#[test]
fn test_fingerprint_is_sha256_of_secret() {
    // sha256("abc")
    let fp = Fingerprint::derive(&Secret::new("abc"), None);
    assert_eq!(
        fp.as_str(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_fingerprint_appends_registry_host() {
    let with_host = Fingerprint::derive(&Secret::new("ab"), Some("c"));
    let concatenated = Fingerprint::derive(&Secret::new("abc"), None);
    assert_eq!(with_host, concatenated);
}

#[test]
fn test_different_secrets_get_different_fingerprints() {
    let a = Endpoint::new(SourceKind::DockerHub, Secret::new("one")).fingerprint();
    let b = Endpoint::new(SourceKind::DockerHub, Secret::new("two")).fingerprint();
    assert_ne!(a, b);
}

#[test]
fn test_registry_host_changes_fingerprint() {
    let plain = Endpoint::new(SourceKind::Nexus, Secret::new("key"));
    let hosted = plain.clone().with_registry_host("container.example.com");
    assert_ne!(plain.fingerprint(), hosted.fingerprint());
}

#[test]
fn test_secret_debug_is_redacted() {
    let rendered = format!("{:?}", Secret::new("hunter2"));
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("REDACTED"));
}

use lodestone::{ResolveError, Specifier};

fn specifier(raw: &str) -> Specifier {
    raw.parse().unwrap()
}

#[test]
fn not_found_names_the_specifier() {
    let err = ResolveError::NotFound(specifier("serializer:post"));
    let message = err.to_string();
    assert!(message.contains("serializer:post"));
    assert!(message.contains("No registration or resolver"));
}

#[test]
fn not_constructible_hints_at_the_fix() {
    let err = ResolveError::NotConstructible(specifier("service:mailer"));
    let message = err.to_string();
    assert!(message.contains("service:mailer"));
    assert!(message.contains("instantiate: false"));
}

#[test]
fn circular_shows_the_full_path() {
    let err = ResolveError::Circular(vec![
        "svc:a".to_string(),
        "svc:b".to_string(),
        "svc:a".to_string(),
    ]);
    assert_eq!(
        err.to_string(),
        "Circular injection chain: svc:a -> svc:b -> svc:a"
    );
}

#[test]
fn invalid_specifier_echoes_the_input() {
    let err = ResolveError::InvalidSpecifier("nocolon".to_string());
    assert!(err.to_string().contains("nocolon"));
    assert!(err.to_string().contains("type:name"));
}

#[test]
fn errors_implement_the_error_trait() {
    let err: Box<dyn std::error::Error> =
        Box::new(ResolveError::MissingDependency("logger".to_string()));
    assert!(err.to_string().contains("logger"));
}

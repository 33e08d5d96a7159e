mod common;

use auth_gateway::{AuthError, RegisterInput, SessionTokenService};
use common::*;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn registered_credentials_always_log_in(
        local in "[a-z][a-z0-9._]{0,15}",
        domain in "[a-z]{2,12}\\.(com|org|io)",
        password in "[ -~]{8,64}",
    ) {
        let email = format!("{local}@{domain}");
        let (registered_id, session_subject) = runtime().block_on(async {
            let h = harness(ProviderBehavior::ExchangeFails);
            let registered = h
                .orchestrator
                .register(RegisterInput {
                    email: email.clone(),
                    password: password.clone(),
                    ..RegisterInput::default()
                })
                .await
                .unwrap();
            let login = h.orchestrator.login(&email, &password).await.unwrap();
            let session = h.sessions.validate(&login.session.token).unwrap();
            (registered.user.id, session.user_id())
        });

        prop_assert_eq!(registered_id, session_subject);
    }

    #[test]
    fn any_other_password_is_rejected(
        password in "[a-zA-Z0-9]{8,32}",
        other in "[a-zA-Z0-9]{8,32}",
    ) {
        prop_assume!(password != other);

        let rejected = runtime().block_on(async {
            let h = harness(ProviderBehavior::ExchangeFails);
            h.orchestrator
                .register(RegisterInput {
                    email: "jane@example.com".to_string(),
                    password: password.clone(),
                    ..RegisterInput::default()
                })
                .await
                .unwrap();
            h.orchestrator.login("jane@example.com", &other).await
        });

        prop_assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));
    }
}

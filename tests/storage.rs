//! Repository scenarios against a live Postgres.
//!
//! Set `DATABASE_URL` to run them; without it each test returns early.

use sessionvault::{
    auth::{ids::generate_id, password::hash_password, TokenSigner},
    config::SignerConfig,
    db,
    tokens::{PgTokenRepository, Token, TokenRepository, TokenWithMetadata},
    users::{PgUserRepository, Profile, UserLogin, UserRegistration, UserRepository},
    ErrorKind,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::{macros::date, Duration, OffsetDateTime};

async fn pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping storage test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    db::migrate(&pool).await.expect("migrations");
    Some(pool)
}

fn registration(username: &str) -> UserRegistration {
    UserRegistration {
        id: generate_id(),
        username: username.to_string(),
        hashed_password: hash_password("secretPassword"),
        profile: Profile {
            first_name: Some("Nikita".into()),
            second_name: Some(generate_id()),
            sex: Some("m".into()),
            birthdate: Some(date!(1999 - 03 - 06)),
            biography: Some("writes storage tests".into()),
            city: Some("Kazan".into()),
        },
    }
}

fn unique(name: &str) -> String {
    format!("{name}-{}", generate_id())
}

#[tokio::test]
async fn create_then_get_by_id_round_trips() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool);
    let params = registration(&unique("nikita"));

    let created = users.create(&params).await.expect("create");
    assert_eq!(created.id, params.id);
    assert_eq!(created.username, params.username);
    assert_eq!(created.profile, params.profile);

    let fetched = users.get_by_id(&params.id).await.expect("get by id");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn login_matches_get_by_id() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool);
    let params = registration(&unique("nikita"));
    users.create(&params).await.expect("create");

    let logged_in = users
        .login(&UserLogin {
            username: params.username.clone(),
            hashed_password: params.hashed_password.clone(),
        })
        .await
        .expect("login");
    let by_id = users.get_by_id(&params.id).await.expect("get by id");
    assert_eq!(logged_in, by_id);

    let err = users
        .login(&UserLogin {
            username: params.username.clone(),
            hashed_password: hash_password("wrong"),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn duplicate_live_username_is_rejected() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool);
    let username = unique("nikita");
    users.create(&registration(&username)).await.expect("first");

    let err = users.create(&registration(&username)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn soft_deleted_user_disappears_from_lookups() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool);
    let params = registration(&unique("nikita"));
    users.create(&params).await.expect("create");

    let found = users
        .search_by_name("Nikita", params.profile.second_name.as_deref().unwrap())
        .await
        .expect("search");
    assert_eq!(found.id, params.id);

    users.delete(&params.id).await.expect("delete");

    for err in [
        users.get_by_id(&params.id).await.unwrap_err(),
        users.get_by_username(&params.username).await.unwrap_err(),
        users
            .search_by_name("Nikita", params.profile.second_name.as_deref().unwrap())
            .await
            .unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    assert!(users
        .list()
        .await
        .expect("list")
        .iter()
        .all(|u| u.id != params.id));

    let again = users.delete(&params.id).await.unwrap_err();
    assert_eq!(again.kind(), ErrorKind::NotFound);

    // the name is free again once the holder is deleted
    let mut reused = registration(&params.username);
    reused.id = generate_id();
    users.create(&reused).await.expect("reuse username");
}

#[tokio::test]
async fn issue_revoke_and_refresh_scenario() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let tokens = PgTokenRepository::new(pool);

    let user_id = unique("u1");
    let username = unique("nikita");
    users
        .create(&UserRegistration {
            id: user_id.clone(),
            username: username.clone(),
            hashed_password: "abc123".into(),
            profile: Profile::default(),
        })
        .await
        .expect("create user");

    let user = users
        .login(&UserLogin {
            username,
            hashed_password: "abc123".into(),
        })
        .await
        .expect("login");
    assert_eq!(user.id, user_id);

    let value = unique("sig.xyz");
    let token_id = unique("t1");
    let created = tokens
        .create(&TokenWithMetadata {
            token_id: token_id.clone(),
            user_id: user_id.clone(),
            token: value.clone(),
            alived_at: OffsetDateTime::now_utc() + Duration::hours(24),
        })
        .await
        .expect("create token");
    let expected = Token {
        user_id: user_id.clone(),
        token: value.clone(),
    };
    assert_eq!(created, expected);

    tokens.revoke(&expected).await.expect("revoke");
    let again = tokens.revoke(&expected).await.unwrap_err();
    assert_eq!(again.kind(), ErrorKind::NotFound);

    let refresh = tokens
        .refresh(&TokenWithMetadata {
            token_id,
            user_id,
            token: value,
            alived_at: OffsetDateTime::now_utc() + Duration::hours(48),
        })
        .await
        .unwrap_err();
    assert_eq!(refresh.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn refresh_keeps_the_token_value() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let tokens = PgTokenRepository::new(pool);
    let user = users
        .create(&registration(&unique("nikita")))
        .await
        .expect("create user");

    let signer = TokenSigner::new(SignerConfig {
        issuer: "servername".into(),
        salt: "somesalt".into(),
    });
    let params = TokenWithMetadata {
        token_id: generate_id(),
        user_id: user.id.clone(),
        token: signer.generate(Some(&user)).expect("sign"),
        alived_at: signer.expiration_horizon(),
    };
    let created = tokens.create(&params).await.expect("create token");

    let refreshed = tokens
        .refresh(&TokenWithMetadata {
            alived_at: params.alived_at + Duration::hours(24),
            ..params.clone()
        })
        .await
        .expect("refresh");
    assert_eq!(refreshed, created);
    assert_eq!(refreshed.token, params.token);
}

#[tokio::test]
async fn refresh_moves_the_stored_horizon() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let tokens = PgTokenRepository::new(pool.clone());
    let user = users
        .create(&registration(&unique("nikita")))
        .await
        .expect("create user");

    let params = TokenWithMetadata {
        token_id: generate_id(),
        user_id: user.id.clone(),
        token: unique("sig"),
        alived_at: db::now_millis() + Duration::hours(24),
    };
    tokens.create(&params).await.expect("create token");
    let err = tokens.get_current_for_user(&user.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let passed = db::now_millis() - Duration::minutes(1);
    tokens
        .refresh(&TokenWithMetadata {
            alived_at: passed,
            ..params.clone()
        })
        .await
        .expect("refresh");

    let stored: OffsetDateTime = sqlx::query_scalar("SELECT alived_at FROM tokens WHERE id = $1")
        .bind(&params.token_id)
        .fetch_one(&pool)
        .await
        .expect("read horizon");
    assert_eq!(stored, passed);

    let current = tokens
        .get_current_for_user(&user.id)
        .await
        .expect("current after refresh");
    assert_eq!(current, params.as_token());
}

#[tokio::test]
async fn revoke_needs_the_owner_and_an_issued_value() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let tokens = PgTokenRepository::new(pool);
    let owner = users
        .create(&registration(&unique("nikita")))
        .await
        .expect("create owner");
    let other = users
        .create(&registration(&unique("ivan")))
        .await
        .expect("create other");

    let params = TokenWithMetadata {
        token_id: generate_id(),
        user_id: owner.id.clone(),
        token: unique("sig"),
        alived_at: OffsetDateTime::now_utc() - Duration::minutes(1),
    };
    let issued = tokens.create(&params).await.expect("create token");

    let wrong_owner = tokens
        .revoke(&Token {
            user_id: other.id.clone(),
            token: issued.token.clone(),
        })
        .await
        .unwrap_err();
    assert_eq!(wrong_owner.kind(), ErrorKind::NotFound);

    let never_issued = tokens
        .revoke(&Token {
            user_id: owner.id.clone(),
            token: unique("never-issued"),
        })
        .await
        .unwrap_err();
    assert_eq!(never_issued.kind(), ErrorKind::NotFound);

    let current = tokens
        .get_current_for_user(&owner.id)
        .await
        .expect("owner's token is still active");
    assert_eq!(current, issued);
    tokens.revoke(&issued).await.expect("owner revokes");
}

#[tokio::test]
async fn current_token_selects_passed_horizons() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let tokens = PgTokenRepository::new(pool);
    let user = users
        .create(&registration(&unique("nikita")))
        .await
        .expect("create user");

    let ahead = TokenWithMetadata {
        token_id: generate_id(),
        user_id: user.id.clone(),
        token: unique("ahead"),
        alived_at: OffsetDateTime::now_utc() + Duration::hours(24),
    };
    tokens.create(&ahead).await.expect("create ahead");
    let err = tokens.get_current_for_user(&user.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let passed = TokenWithMetadata {
        token_id: generate_id(),
        user_id: user.id.clone(),
        token: unique("passed"),
        alived_at: OffsetDateTime::now_utc() - Duration::minutes(1),
    };
    tokens.create(&passed).await.expect("create passed");
    let current = tokens
        .get_current_for_user(&user.id)
        .await
        .expect("current");
    assert_eq!(current.token, passed.token);

    tokens.revoke(&current).await.expect("revoke");
    let err = tokens.get_current_for_user(&user.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

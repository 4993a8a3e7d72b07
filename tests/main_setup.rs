use dashboard_gate::{AppConfig, config::Env, policy::PolicyError};
use serial_test::serial;
use std::{env, io::Write, panic};

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

const ALL_VARS: [&str; 6] = [
    "APP_ENV",
    "SESSION_JWT_SECRET",
    "SESSION_COOKIE_NAME",
    "ROUTE_POLICY_PATH",
    "DASHBOARD_DIST_DIR",
    "BIND_ADDR",
];

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(
        || {
            panic::catch_unwind(|| {
                unsafe {
                    env::set_var("APP_ENV", "production");
                    env::remove_var("SESSION_JWT_SECRET");
                }
                AppConfig::load()
            })
        },
        ALL_VARS.to_vec(),
    );

    assert!(
        result.is_err(),
        "Production config loading should panic on a missing token secret"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                for var in &ALL_VARS[1..] {
                    env::remove_var(var);
                }
            }
            AppConfig::load()
        },
        ALL_VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Local);
    assert!(config.env_explicit);
    assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");
    assert_eq!(config.session_cookie_name, "accessToken");
    assert_eq!(config.policy_path, None);
    assert_eq!(config.dashboard_dir, "dist");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_app_config_missing_app_env_is_flagged() {
    let config = run_with_env(
        || {
            unsafe {
                for var in ALL_VARS {
                    env::remove_var(var);
                }
            }
            AppConfig::load()
        },
        ALL_VARS.to_vec(),
    );

    // Falls back to Local (which enables the dev role header) but records that
    // the environment was never chosen, so startup can warn about it.
    assert_eq!(config.env, Env::Local);
    assert!(!config.env_explicit);
}

#[test]
#[serial]
fn test_app_config_production_reads_overrides() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("SESSION_JWT_SECRET", "prod-secret");
                env::set_var("SESSION_COOKIE_NAME", "session");
                env::set_var("ROUTE_POLICY_PATH", "/etc/gate/policy.json");
                env::set_var("DASHBOARD_DIST_DIR", "/srv/dashboard");
                env::set_var("BIND_ADDR", "127.0.0.1:8080");
            }
            AppConfig::load()
        },
        ALL_VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Production);
    assert!(config.env_explicit);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.session_cookie_name, "session");
    assert_eq!(config.policy_path.as_deref(), Some("/etc/gate/policy.json"));
    assert_eq!(config.dashboard_dir, "/srv/dashboard");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
fn test_load_policy_defaults_to_builtin_table() {
    let policy = AppConfig::default()
        .load_policy()
        .expect("built-in policy must validate");
    assert_eq!(policy, dashboard_gate::PolicyConfig::default());
}

#[test]
fn test_load_policy_reads_override_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "routes": {{
                "COMMON": ["/dashboard/login"],
                "USER": ["/dashboard/profile"]
            }},
            "homes": {{ "USER": "/dashboard/profile", "ADMIN": "/dashboard/admin" }}
        }}"#
    )
    .unwrap();

    let config = AppConfig {
        policy_path: Some(file.path().display().to_string()),
        ..AppConfig::default()
    };
    let policy = config.load_policy().expect("override should validate");

    assert_eq!(policy.home_for(dashboard_gate::Role::User), "/dashboard/profile");
    assert_eq!(policy.callback_param, "callbackUrl");
}

#[test]
fn test_load_policy_missing_file_is_read_error() {
    let config = AppConfig {
        policy_path: Some("/definitely/not/here/policy.json".to_string()),
        ..AppConfig::default()
    };
    assert!(matches!(config.load_policy(), Err(PolicyError::Read { .. })));
}

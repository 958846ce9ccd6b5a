//! Tests for validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::cli::Cli;
use super::error::field;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};
use super::{ConfigError, defaults};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["ipwatch"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod defaults_applied {
    use super::*;

    #[test]
    fn empty_sources_use_builtin_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(config.probe_url.as_str(), "https://api.ipify.org/");
        assert_eq!(config.probe_timeout, defaults::probe_timeout());
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.notify_timeout, defaults::notify_timeout());
        assert_eq!(config.history_file, PathBuf::from("ip_history.jsonl"));
        assert!(config.listen.is_none());
        assert!(config.email.is_none());
        assert!(config.telegram.is_none());
        assert_eq!(config.channel_count(), 0);
        assert!(!config.silent_baseline);
        assert!(!config.dry_run);
    }
}

mod precedence {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let toml = toml(
            r#"
            [probe]
            url = "https://ifconfig.me/ip"
            timeout = 4

            [monitor]
            interval = 60
            history_file = "from-toml.jsonl"

            [api]
            listen = "127.0.0.1:5000"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.probe_url.as_str(), "https://ifconfig.me/ip");
        assert_eq!(config.probe_timeout, Duration::from_secs(4));
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.history_file, PathBuf::from("from-toml.jsonl"));
        assert_eq!(config.listen, Some("127.0.0.1:5000".parse().unwrap()));
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r#"
            [monitor]
            interval = 60
            history_file = "from-toml.jsonl"
        "#,
        );
        let cli = cli(&["--interval", "30", "--history-file", "from-cli.jsonl"]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.history_file, PathBuf::from("from-cli.jsonl"));
    }

    #[test]
    fn boolean_flags_use_or_semantics() {
        let toml = toml("[monitor]\nsilent_baseline = true");

        let from_toml = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let from_cli = ValidatedConfig::from_raw(&cli(&["--silent-baseline"]), None).unwrap();

        assert!(from_toml.silent_baseline);
        assert!(from_cli.silent_baseline);
    }

    #[test]
    fn cli_credentials_override_toml() {
        let toml = toml(
            r#"
            [telegram]
            enabled = true
            bot_token = "toml-token"
            chat_id = "1"
        "#,
        );
        let cli = cli(&["--telegram-chat-id", "2"]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();
        let telegram = config.telegram.unwrap();

        assert_eq!(telegram.bot_token, "toml-token");
        assert_eq!(telegram.chat_id, "2");
    }
}

mod validation {
    use super::*;

    #[test]
    fn rejects_zero_interval() {
        let result = ValidatedConfig::from_raw(&cli(&["--interval", "0"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "monitor.interval",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_timeouts() {
        let probe = ValidatedConfig::from_raw(&cli(&["--probe-timeout", "0"]), None);
        let notify = ValidatedConfig::from_raw(&cli(&["--notify-timeout", "0"]), None);

        assert!(matches!(probe, Err(ConfigError::InvalidDuration { .. })));
        assert!(matches!(notify, Err(ConfigError::InvalidDuration { .. })));
    }

    #[test]
    fn rejects_invalid_probe_url() {
        let result = ValidatedConfig::from_raw(&cli(&["--probe-url", "not a url"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl {
                field: "probe.url",
                ..
            })
        ));
    }

    #[test]
    fn rejects_invalid_listen_address() {
        let result = ValidatedConfig::from_raw(&cli(&["--listen", "localhost"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidListen { .. })));
    }

    #[test]
    fn rejects_invalid_template() {
        let toml = toml(
            r#"
            [telegram]
            enabled = true
            bot_token = "123:abc"
            chat_id = "42"
            text = "{{#if ip}}unclosed"
        "#,
        );

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidTemplate {
                field: "telegram.text",
                ..
            })
        ));
    }

    #[test]
    fn templates_of_disabled_channels_are_not_checked() {
        let toml = toml("[telegram]\ntext = \"{{#if ip}}unclosed\"");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert!(config.telegram.is_none());
    }
}

mod email {
    use super::*;

    #[test]
    fn disabled_channel_ignores_partial_settings() {
        let toml = toml("[email]\nfrom = \"a@example.com\"");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert!(config.email.is_none());
    }

    #[test]
    fn enabled_without_key_fails() {
        let cli = cli(&["--email", "--email-from", "a@example.com"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::EMAIL_API_KEY,
                ..
            })
        ));
    }

    #[test]
    fn enabled_without_sender_fails() {
        let cli = cli(&["--email", "--email-api-key", "re_1"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::EMAIL_FROM,
                ..
            })
        ));
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let cli = cli(&[
            "--email",
            "--email-api-key",
            "",
            "--email-from",
            "a@example.com",
        ]);

        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(result, Err(ConfigError::MissingRequired { .. })));
    }

    #[test]
    fn key_with_newline_is_rejected_without_echoing_it() {
        let cli = cli(&[
            "--email",
            "--email-api-key",
            "secret\nvalue",
            "--email-from",
            "a@example.com",
        ]);

        let err = ValidatedConfig::from_raw(&cli, None).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSecret { .. }));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn recipient_defaults_to_sender() {
        let cli = cli(&[
            "--email",
            "--email-api-key",
            "re_1",
            "--email-from",
            "me@example.com",
        ]);

        let email = ValidatedConfig::from_raw(&cli, None)
            .unwrap()
            .email
            .unwrap();

        assert_eq!(email.to, "me@example.com");
        assert_eq!(email.api_url.as_str(), defaults::EMAIL_API_URL);
        assert_eq!(email.subject.source(), defaults::EMAIL_SUBJECT);
        assert_eq!(email.body.source(), defaults::EMAIL_BODY);
    }

    #[test]
    fn enabled_from_toml() {
        let toml = toml(
            r#"
            [email]
            enabled = true
            api_key = "re_1"
            from = "a@example.com"
            to = "b@example.com"
            subject = "Now {{ip}}"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let email = config.email.as_ref().unwrap();

        assert_eq!(email.to, "b@example.com");
        assert_eq!(email.subject.source(), "Now {{ip}}");
        assert_eq!(config.channel_count(), 1);
    }
}

mod telegram {
    use super::*;

    #[test]
    fn enabled_without_token_fails() {
        let cli = cli(&["--telegram", "--telegram-chat-id", "42"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::TELEGRAM_BOT_TOKEN,
                ..
            })
        ));
    }

    #[test]
    fn enabled_without_chat_fails() {
        let cli = cli(&["--telegram", "--telegram-bot-token", "123:abc"]);
        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::TELEGRAM_CHAT_ID,
                ..
            })
        ));
    }

    #[test]
    fn token_with_slash_is_rejected() {
        let cli = cli(&[
            "--telegram",
            "--telegram-bot-token",
            "123/abc",
            "--telegram-chat-id",
            "42",
        ]);

        let result = ValidatedConfig::from_raw(&cli, None);

        assert!(matches!(result, Err(ConfigError::InvalidSecret { .. })));
    }

    #[test]
    fn defaults_api_base_and_text() {
        let cli = cli(&[
            "--telegram",
            "--telegram-bot-token",
            "123:abc",
            "--telegram-chat-id",
            "42",
        ]);

        let telegram = ValidatedConfig::from_raw(&cli, None)
            .unwrap()
            .telegram
            .unwrap();

        assert_eq!(telegram.api_base.as_str(), "https://api.telegram.org/");
        assert_eq!(telegram.text.source(), defaults::TELEGRAM_TEXT);
    }
}

mod display {
    use super::*;

    fn both_channels() -> ValidatedConfig {
        let cli = cli(&[
            "--email",
            "--email-api-key",
            "re_supersecret",
            "--email-from",
            "me@example.com",
            "--telegram",
            "--telegram-bot-token",
            "123:tokensecret",
            "--telegram-chat-id",
            "42",
        ]);
        ValidatedConfig::from_raw(&cli, None).unwrap()
    }

    #[test]
    fn display_never_prints_secrets() {
        let text = both_channels().to_string();

        assert!(text.contains("to me@example.com"));
        assert!(text.contains("chat 42"));
        assert!(!text.contains("supersecret"));
        assert!(!text.contains("tokensecret"));
    }

    #[test]
    fn debug_never_prints_secrets() {
        let text = format!("{:?}", both_channels());

        assert!(text.contains("<redacted>"));
        assert!(!text.contains("supersecret"));
        assert!(!text.contains("tokensecret"));
    }

    #[test]
    fn display_shows_disabled_parts() {
        let text = ValidatedConfig::from_raw(&cli(&[]), None)
            .unwrap()
            .to_string();

        assert!(text.contains("api: disabled"));
        assert!(text.contains("email: disabled"));
        assert!(text.contains("telegram: disabled"));
    }
}

mod loading {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[monitor]\ninterval = 45").unwrap();
        let path = file.path().to_str().unwrap();

        let config = ValidatedConfig::load(&cli(&["--config", path])).unwrap();

        assert_eq!(config.interval, Duration::from_secs(45));
    }

    #[test]
    fn load_without_config_file_uses_cli_only() {
        let config = ValidatedConfig::load(&cli(&["--interval", "15"])).unwrap();
        assert_eq!(config.interval, Duration::from_secs(15));
    }

    #[test]
    fn history_file_resolves_without_validating_channels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[monitor]\nhistory_file = \"h.jsonl\"\n[email]\nenabled = true"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let history = ValidatedConfig::history_path(&cli(&["--config", path])).unwrap();

        assert_eq!(history, PathBuf::from("h.jsonl"));
    }

    #[test]
    fn write_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipwatch.toml");

        write_default_config(&path).unwrap();
        let config = TomlConfig::load(&path).unwrap();

        assert_eq!(config.monitor.interval, Some(defaults::INTERVAL_SECS));
    }

    #[test]
    fn write_default_config_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ipwatch.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}

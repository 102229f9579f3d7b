use clap::ValueEnum;
use std::fmt::Write;

use crate::aws::TemporaryCredentials;

/// Shell dialect used to render environment variable assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Shell {
    Bash,
    Powershell,
    Cmd,
    Docker,
}

impl Shell {
    /// PowerShell on Windows, bash everywhere else.
    pub(crate) fn detect() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    fn for_os(os: &str) -> Self {
        match os {
            "windows" => Self::Powershell,
            _ => Self::Bash,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Self::Bash => Syntax {
                prefix: "export ",
                delimiter: "=",
                suffix: "\n",
            },
            Self::Powershell => Syntax {
                prefix: "$env:",
                delimiter: " = '",
                suffix: "'\n",
            },
            Self::Cmd => Syntax {
                prefix: "set ",
                delimiter: "=",
                suffix: "\n",
            },
            Self::Docker => Syntax {
                prefix: " -e ",
                delimiter: "=",
                suffix: "",
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Syntax {
    prefix: &'static str,
    delimiter: &'static str,
    suffix: &'static str,
}

/// Values rendered into one export block.
#[derive(Debug, Clone)]
pub(crate) struct EnvVariables {
    pub account_id: String,
    pub account_name: String,
    pub credentials: TemporaryCredentials,
    pub region: Option<String>,
}

type Selector = fn(&EnvVariables) -> String;

/// Sorted by variable name; the region pair is emitted ahead of these.
const VARIABLES: [(&str, Selector); 6] = [
    ("AWS_ACCESS_KEY_ID", |env: &EnvVariables| env.credentials.access_key_id.clone()),
    ("AWS_ACCOUNT_NAME", |env: &EnvVariables| env.account_name.clone()),
    ("AWS_ACCOUNT_NUMBER", |env: &EnvVariables| env.account_id.clone()),
    ("AWS_SECRET_ACCESS_KEY", |env: &EnvVariables| env.credentials.secret_access_key.clone()),
    ("AWS_SESSION_EXPIRATION", |env: &EnvVariables| env.credentials.expiration.to_string()),
    ("AWS_SESSION_TOKEN", |env: &EnvVariables| env.credentials.session_token.clone()),
];

const REGION_VARIABLES: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

impl EnvVariables {
    pub(crate) fn render(&self, shell: Shell) -> String {
        let syntax = shell.syntax();
        let mut out = String::new();
        let mut assign = |name: &str, value: &str| {
            let _ = write!(
                out,
                "{}{}{}{}{}",
                syntax.prefix, name, syntax.delimiter, value, syntax.suffix
            );
        };

        if let Some(region) = self.region.as_deref().filter(|region| !region.is_empty()) {
            for name in REGION_VARIABLES {
                assign(name, region);
            }
        }
        for (name, select) in VARIABLES {
            assign(name, &select(self));
        }

        out
    }
}

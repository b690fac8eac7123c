//! Mail transport settings.
//!
//! Settings can be loaded from environment variables or a `.toml`/`.json`
//! configuration file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::backends::{SmtpConfig, SmtpSecurity};
use crate::encoding::NameEncoding;
use crate::{MailError, MailResult};

/// Which mail manager to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackendKind {
	#[default]
	Smtp,
	Sendmail,
	File,
	Console,
	Memory,
}

impl FromStr for MailBackendKind {
	type Err = MailError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"smtp" => Ok(MailBackendKind::Smtp),
			"sendmail" => Ok(MailBackendKind::Sendmail),
			"file" => Ok(MailBackendKind::File),
			"console" => Ok(MailBackendKind::Console),
			"memory" => Ok(MailBackendKind::Memory),
			other => Err(MailError::Configuration(format!(
				"Unknown mail backend: {}",
				other
			))),
		}
	}
}

/// Mail transport settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
	pub backend: MailBackendKind,
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<String>,
	pub security: SmtpSecurity,
	/// SMTP timeout in seconds
	pub timeout: Option<u64>,
	/// Sendmail binary; `sendmail` on the `PATH` when unset
	pub sendmail_command: Option<String>,
	/// Output directory of the file backend
	pub file_path: Option<PathBuf>,
	pub name_encoding: NameEncoding,
}

impl Default for MailSettings {
	fn default() -> Self {
		Self {
			backend: MailBackendKind::Smtp,
			host: "localhost".to_string(),
			port: 25,
			username: None,
			password: None,
			security: SmtpSecurity::None,
			timeout: None,
			sendmail_command: None,
			file_path: None,
			name_encoding: NameEncoding::Raw,
		}
	}
}

impl MailSettings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_backend(mut self, backend: MailBackendKind) -> Self {
		self.backend = backend;
		self
	}

	pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.file_path = Some(path.into());
		self
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}

	/// SMTP part of the settings.
	pub fn smtp_config(&self) -> SmtpConfig {
		let mut config = SmtpConfig::new(self.host.clone(), self.port).with_security(self.security);
		if let (Some(username), Some(password)) = (&self.username, &self.password) {
			config = config.with_credentials(username.clone(), password.clone());
		}
		if let Some(timeout) = self.timeout {
			config = config.with_timeout(Duration::from_secs(timeout));
		}
		config
	}

	/// Load settings from environment variables
	///
	/// # Environment Variables
	///
	/// - `DMF_MAIL_BACKEND`: "smtp", "sendmail", "file", "console" or "memory"
	/// - `DMF_MAIL_HOST`, `DMF_MAIL_PORT`: SMTP server
	/// - `DMF_MAIL_USERNAME`, `DMF_MAIL_PASSWORD`: SMTP credentials
	/// - `DMF_MAIL_SECURITY`: "none", "starttls" or "tls"
	/// - `DMF_MAIL_TIMEOUT`: SMTP timeout in seconds
	/// - `DMF_MAIL_SENDMAIL_COMMAND`: sendmail binary
	/// - `DMF_MAIL_FILE_PATH`: output directory of the file backend
	/// - `DMF_MAIL_NAME_ENCODING`: "raw" or "encoded_word"
	pub fn from_env() -> MailResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MailResult<Self> {
		let mut settings = Self::default();

		if let Some(backend) = lookup("DMF_MAIL_BACKEND") {
			settings.backend = backend.parse()?;
		}

		if let Some(host) = lookup("DMF_MAIL_HOST") {
			settings.host = host;
		}

		if let Some(port) = lookup("DMF_MAIL_PORT") {
			settings.port = port.trim().parse().map_err(|_| {
				MailError::Configuration(format!("DMF_MAIL_PORT is not a valid port: {}", port))
			})?;
		}

		settings.username = lookup("DMF_MAIL_USERNAME");
		settings.password = lookup("DMF_MAIL_PASSWORD");

		if let Some(security) = lookup("DMF_MAIL_SECURITY") {
			settings.security = security.parse()?;
		}

		if let Some(timeout) = lookup("DMF_MAIL_TIMEOUT") {
			let seconds = timeout.trim().parse().map_err(|_| {
				MailError::Configuration(format!(
					"DMF_MAIL_TIMEOUT is not a number of seconds: {}",
					timeout
				))
			})?;
			settings.timeout = Some(seconds);
		}

		settings.sendmail_command = lookup("DMF_MAIL_SENDMAIL_COMMAND");
		settings.file_path = lookup("DMF_MAIL_FILE_PATH").map(PathBuf::from);

		if let Some(encoding) = lookup("DMF_MAIL_NAME_ENCODING") {
			settings.name_encoding = encoding.parse()?;
		}

		Ok(settings)
	}

	/// Load settings from a configuration file
	pub fn from_file(path: impl Into<PathBuf>) -> MailResult<Self> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			MailError::Configuration(format!("Failed to read {}: {}", path.display(), e))
		})?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| MailError::Configuration(format!("TOML parse error: {}", e))),
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| MailError::Configuration(format!("JSON parse error: {}", e))),
			_ => Err(MailError::Configuration(
				"Supported formats: .toml, .json".to_string(),
			)),
		}
	}
}

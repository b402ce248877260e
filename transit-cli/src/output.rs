use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use serde_json::{Value, json};
use std::io::Write;
use transit_auth::Identity;

pub struct OutputManager {
    colored: bool,
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(colored: bool, format: OutputFormat) -> Self {
        Self { colored, format }
    }

    pub fn format_identity(&self, identity: &Identity) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize("User:", &Color::Green, true));
                output.push('\n');
                self.push_field(&mut output, "Name", &identity.display_name());
                self.push_field(&mut output, "Username", &identity.username);
                self.push_field(&mut output, "Email", &identity.email);
                self.push_field(&mut output, "ID", &identity.id.to_string());
                Ok(output)
            }
            _ => self.format_json(&serde_json::to_value(identity)?),
        }
    }

    /// Render a response payload.
    pub fn format_payload(&self, payload: &Value) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => {
                let mut output = serde_json::to_string_pretty(payload)?;
                output.push('\n');
                Ok(output)
            }
            _ => self.format_json(payload),
        }
    }

    pub fn format_status(&self, authenticated: bool, identity: Option<&Identity>) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => {
                let mut output = String::new();
                if authenticated {
                    output.push_str(&self.colorize("Logged in", &Color::Green, true));
                    if let Some(identity) = identity {
                        output.push_str(&format!(
                            " as {}",
                            self.colorize(&identity.username, &Color::Cyan, false)
                        ));
                    }
                } else {
                    output.push_str(&self.colorize("Not logged in", &Color::Yellow, true));
                }
                output.push('\n');
                Ok(output)
            }
            _ => self.format_json(&json!({
                "authenticated": authenticated,
                "user": identity,
            })),
        }
    }

    pub fn format_message(&self, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => Ok(format!("{} {}\n", self.colorize("✓", &Color::Green, true), message)),
            _ => self.format_json(&json!({ "status": "ok", "message": message })),
        }
    }

    fn format_json(&self, value: &Value) -> Result<String> {
        let mut output = if self.format == OutputFormat::JsonCompact {
            serde_json::to_string(value)
        } else {
            serde_json::to_string_pretty(value)
        }?;
        output.push('\n');
        Ok(output)
    }

    fn push_field(&self, output: &mut String, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(name, &Color::Yellow, false),
            self.colorize(value, &Color::Cyan, false)
        ));
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Cyan,
}

pub fn write_output(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

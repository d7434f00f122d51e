//! # Patient Session Loop
//!
//! The interactive, user-driven loop on the patient side. One session owns
//! one connection to the doctor; the menu drives which message gets built
//! and written next. Exiting the menu drops the connection, which the
//! doctor's dispatcher observes as a normal disconnect.
//!
//! Local problems with an outgoing file (missing, too large) are reported
//! to the user and skipped without transmitting anything; the session keeps
//! running. Connection-level failures propagate out and end the session.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::common::connection::Connection;
use crate::common::messages::Message;

/// Largest file a patient may send, enforced before any network write.
/// The doctor performs no independent size check.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Why an outgoing file was rejected locally.
#[derive(Debug, PartialEq, Eq)]
pub enum FileRejected {
    /// Path does not exist or is not a regular file
    NotFound,
    /// File exceeds [`MAX_FILE_SIZE`]
    TooLarge { size: u64 },
}

impl fmt::Display for FileRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRejected::NotFound => write!(f, "File not found!"),
            FileRejected::TooLarge { size } => {
                write!(f, "File too large: {} bytes (max 10MB)", size)
            }
        }
    }
}

/// Validate and read a file the user wants to send.
///
/// Checked entirely before transmission: a missing path or a file over the
/// cap is rejected here and nothing goes on the wire.
pub fn load_outgoing_file(path: &Path) -> Result<Vec<u8>, FileRejected> {
    let meta = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(FileRejected::NotFound),
    };

    if meta.len() > MAX_FILE_SIZE {
        return Err(FileRejected::TooLarge { size: meta.len() });
    }

    std::fs::read(path).map_err(|_| FileRejected::NotFound)
}

/// Generate a vitals reading within the fixed plausible ranges:
/// heart rate 60-109 bpm, temperature 36.0-38.0 °C, oxygen 90-99%.
fn generate_vitals() -> (u32, f64, u32) {
    let mut rng = rand::thread_rng();
    let heart_rate = rng.gen_range(60..110);
    let temperature = rng.gen_range(36.0..38.0);
    let oxygen_level = rng.gen_range(90..100);
    (heart_rate, temperature, oxygen_level)
}

/// One interactive patient session over one connection to the doctor.
pub struct PatientSession {
    patient_id: u32,
    conn: Connection,
    input: BufReader<Stdin>,
}

impl PatientSession {
    /// Connect to the doctor and set up the session.
    pub async fn connect(doctor_address: &str, patient_id: u32) -> Result<Self> {
        let conn = Connection::connect(doctor_address)
            .await
            .context("could not reach the doctor")?;

        Ok(Self {
            patient_id,
            conn,
            input: BufReader::new(tokio::io::stdin()),
        })
    }

    /// Run the menu loop until the user exits or the connection fails.
    pub async fn run(mut self) -> Result<()> {
        println!("Connected to Doctor! Patient ID: {}", self.patient_id);
        println!("================================================");

        loop {
            println!();
            println!("--- Patient Menu ---");
            println!("1. Send Vitals & Symptoms");
            println!("2. Send Medical File");
            println!("3. Exit");

            // Stdin EOF is treated like choosing exit.
            let Some(choice) = self.prompt("Choose option: ").await? else {
                println!("Disconnecting...");
                break;
            };
            match choice.trim() {
                "1" => self.send_vitals().await?,
                "2" => self.send_file().await?,
                "3" => {
                    println!("Disconnecting...");
                    break;
                }
                _ => println!("Invalid option!"),
            }
        }

        // Dropping the connection here closes the socket; the doctor sees
        // a clean disconnect, not an error.
        Ok(())
    }

    async fn send_vitals(&mut self) -> Result<()> {
        let (heart_rate, temperature, oxygen_level) = generate_vitals();
        let note = self
            .prompt("Enter symptom (or press Enter to skip): ")
            .await?
            .unwrap_or_default();

        let msg = Message::Vitals {
            patient_id: self.patient_id,
            temperature,
            heart_rate,
            oxygen_level,
            note: note.trim_end().to_string(),
        };
        self.conn.write_message(&msg).await?;

        info!("vitals sent: hr={} spo2={}", heart_rate, oxygen_level);
        println!(">>> Vitals sent to Doctor!");
        println!(
            "    HR: {} bpm, SpO2: {}%, Temp: {:.1}°C",
            heart_rate, oxygen_level, temperature
        );
        Ok(())
    }

    async fn send_file(&mut self) -> Result<()> {
        let path_line = self.prompt("Enter file path: ").await?.unwrap_or_default();
        let path = Path::new(path_line.trim());

        let content = match load_outgoing_file(path) {
            Ok(content) => content,
            Err(reason) => {
                // Local rejection: nothing transmitted, session continues.
                println!("Error: {}", reason);
                return Ok(());
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file_type = self
            .prompt("Enter file type (image/document/lab_report/xray/other): ")
            .await?
            .unwrap_or_default();
        let description = self
            .prompt("Enter file description: ")
            .await?
            .unwrap_or_default();

        let byte_len = content.len();
        let msg = Message::file_transfer(
            self.patient_id,
            file_name.clone(),
            content,
            file_type.trim().to_string(),
            description.trim().to_string(),
        );
        self.conn.write_message(&msg).await?;

        info!("file '{}' sent ({} bytes)", file_name, byte_len);
        println!(">>> File sent to Doctor!");
        println!("    File: {} ({} bytes)", file_name, byte_len);
        Ok(())
    }

    /// Print a prompt and read one line from stdin. `None` means stdin
    /// reached end-of-file.
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        use std::io::Write;

        print!("{}", text);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_outgoing_file(&dir.path().join("no_such_file.pdf"));
        assert_eq!(result.unwrap_err(), FileRejected::NotFound);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_outgoing_file(dir.path());
        assert_eq!(result.unwrap_err(), FileRejected::NotFound);
    }

    #[test]
    fn file_at_cap_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exactly_10mb.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; MAX_FILE_SIZE as usize]).unwrap();

        let content = load_outgoing_file(&path).unwrap();
        assert_eq!(content.len() as u64, MAX_FILE_SIZE);
    }

    #[test]
    fn file_over_cap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_byte_over.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; MAX_FILE_SIZE as usize + 1]).unwrap();

        let result = load_outgoing_file(&path);
        assert_eq!(
            result.unwrap_err(),
            FileRejected::TooLarge {
                size: MAX_FILE_SIZE + 1
            }
        );
    }
}

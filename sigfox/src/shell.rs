use crate::commands::{MAIN_MENU, MainAction, handle_device};
use crate::prompt::{Prompter, pause, select, select_from_list};
use anyhow::{Context, Result, bail};
use colored::*;
use sigfox_core::{
    ConfigStore, DeviceSession, JsonConfigStore, LibraryCatalog, PortScanner, Settings, Timeouts,
    Transact,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

/// Login details for the running session; never written to disk
pub struct Credentials {
    pub username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password: Zeroizing::new(password),
        }
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// State that lives only as long as the process
#[derive(Debug, Default)]
pub struct ShellContext {
    pub device: Option<String>,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellState {
    SelectDevice,
    MainMenu,
    AwaitingAck,
}

/// The interactive menu loop
pub struct Shell<'a, P, T: ?Sized, S: ?Sized> {
    pub(crate) prompter: P,
    pub(crate) transport: &'a T,
    pub(crate) scanner: &'a S,
    pub(crate) store: JsonConfigStore,
    pub(crate) catalog: LibraryCatalog,
    pub(crate) config_dir: PathBuf,
    pub(crate) timeouts: Timeouts,
    pub(crate) context: ShellContext,
}

impl<'a, P, T, S> Shell<'a, P, T, S>
where
    P: Prompter,
    T: Transact + ?Sized,
    S: PortScanner + ?Sized,
{
    pub fn new(
        config_dir: &Path,
        timeouts: Timeouts,
        prompter: P,
        transport: &'a T,
        scanner: &'a S,
    ) -> Self {
        Self {
            prompter,
            transport,
            scanner,
            store: JsonConfigStore::new(config_dir),
            catalog: LibraryCatalog::new(config_dir),
            config_dir: config_dir.to_path_buf(),
            timeouts,
            context: ShellContext::default(),
        }
    }

    #[cfg(test)]
    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    /// Run until the operator picks Exit
    pub fn run(&mut self) -> Result<()> {
        let mut state = ShellState::SelectDevice;

        loop {
            state = match state {
                ShellState::SelectDevice => {
                    // Bad settings should stop us before the operator picks anything
                    let settings = self.load_settings()?;
                    self.catalog.load(&settings.at_library).with_context(|| {
                        format!("Failed to load AT library {}", settings.at_library)
                    })?;

                    let Some(device) = self.choose_device()? else {
                        bail!("No devices found...");
                    };
                    self.context.device = Some(device);
                    ShellState::MainMenu
                }
                ShellState::MainMenu => match select(&mut self.prompter, "Command:", &MAIN_MENU)? {
                    MainAction::Exit => {
                        println!("Exiting program...");
                        return Ok(());
                    }
                    MainAction::Config => {
                        self.config_menu()?;
                        ShellState::MainMenu
                    }
                    MainAction::Device(action) => {
                        let device = self.context.device.clone().context("No device selected")?;
                        println!("{}", format!("Initialising {device}").blue());

                        // Rebuilt from the persisted settings for every operation
                        let session = self.session(&device)?;
                        handle_device(&session, action, &mut self.prompter)?;
                        ShellState::AwaitingAck
                    }
                },
                ShellState::AwaitingAck => {
                    pause(&mut self.prompter)?;
                    ShellState::MainMenu
                }
            };
        }
    }

    fn load_settings(&self) -> Result<Settings> {
        self.store
            .load()
            .with_context(|| format!("Failed to read {}", self.store.path().display()))
    }

    fn session(&self, device: &str) -> Result<DeviceSession<'a, T>> {
        let settings = self.load_settings()?;
        let session = DeviceSession::from_settings(device, &settings, &self.catalog, self.transport)
            .context("Failed to load the configured AT library")?;
        Ok(session.with_timeouts(self.timeouts))
    }

    /// Scan for openable ports and let the operator pick one; `None` if there are none
    pub(crate) fn choose_device(&mut self) -> Result<Option<String>> {
        let ports = self.scanner.scan()?;
        if ports.is_empty() {
            return Ok(None);
        }

        let device = select_from_list(&mut self.prompter, "Select Device:", &ports)?.to_string();
        info!("Selected device {device}");
        Ok(Some(device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompter;
    use anyhow::Result;
    use sigfox_core::{Response, ScanError, SerialError};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        device: String,
        baud_rate: u32,
        command: String,
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingTransport {
        fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.command.clone()).collect()
        }
    }

    impl Transact for RecordingTransport {
        fn execute(
            &self,
            device: &str,
            baud_rate: u32,
            command: &str,
            _timeout: Duration,
        ) -> Result<Response, SerialError> {
            self.calls.borrow_mut().push(Call {
                device: device.to_string(),
                baud_rate,
                command: command.to_string(),
            });
            Ok(Response::new("OK\r\n", true))
        }
    }

    struct FixedScanner(Vec<&'static str>);

    impl PortScanner for FixedScanner {
        fn scan(&self) -> Result<Vec<String>, ScanError> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    /// Returns one port list per scan, then nothing
    struct SequencedScanner(RefCell<VecDeque<Vec<&'static str>>>);

    impl PortScanner for SequencedScanner {
        fn scan(&self) -> Result<Vec<String>, ScanError> {
            let ports = self.0.borrow_mut().pop_front().unwrap_or_default();
            Ok(ports.iter().map(|p| p.to_string()).collect())
        }
    }

    fn config_dir() -> Result<TempDir> {
        let dir = tempfile::tempdir()?;
        let libraries = dir.path().join("AT_Libraries");
        fs::create_dir_all(&libraries)?;
        fs::write(
            libraries.join("Wisol.json"),
            r#"{"Commands":{"ID":"AT$I=10","PAC":"AT$I=11","Version":"AT$I=13","Send":"AT$SF="}}"#,
        )?;
        fs::write(
            libraries.join("Legacy.json"),
            r#"{"Commands":{"ID":"ATI7","PAC":"ATI8","Version":"ATI0","Send":"AT$SS="}}"#,
        )?;
        fs::write(
            dir.path().join("config.json"),
            r#"{"BaudRate": 9600, "AT_Library": "Wisol.json"}"#,
        )?;
        Ok(dir)
    }

    fn run_script(
        dir: &TempDir,
        ports: Vec<&'static str>,
        answers: &[&str],
    ) -> (Result<()>, RecordingTransport, usize) {
        let transport = RecordingTransport::default();
        let scanner = FixedScanner(ports);
        let mut shell = Shell::new(
            dir.path(),
            Timeouts::default(),
            ScriptedPrompter::new(answers),
            &transport,
            &scanner,
        );
        let result = shell.run();
        let remaining = shell.prompter.remaining();
        drop(shell);
        (result, transport, remaining)
    }

    #[test]
    fn test_no_devices_is_fatal() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, remaining) = run_script(&dir, vec![], &["1", "0"]);

        let error = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(error.contains("No devices found"));
        assert!(transport.commands().is_empty());
        // The main menu was never shown
        assert_eq!(remaining, 2);
        Ok(())
    }

    #[test]
    fn test_get_id_then_exit() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, remaining) =
            run_script(&dir, vec!["/dev/ttyUSB0"], &["1", "1", "", "0"]);

        result?;
        assert_eq!(remaining, 0);
        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            Call {
                device: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
                command: "AT$I=10".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_every_query_operation() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "1", "", "2", "", "3", "", "0"],
        );

        result?;
        assert_eq!(transport.commands(), vec!["AT$I=10", "AT$I=11", "AT$I=13"]);
        Ok(())
    }

    #[test]
    fn test_invalid_payload_is_reprompted() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "4", "1a2b3c", "", "ABCDEF0123456789ABCDEF012", "1A2B3C", "", "0"],
        );

        result?;
        assert_eq!(transport.commands(), vec!["AT$SF=1A2B3C"]);
        Ok(())
    }

    #[test]
    fn test_custom_command_is_verbatim() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "5", " AT$P=1 ", "", "0"],
        );

        result?;
        assert_eq!(transport.commands(), vec![" AT$P=1 "]);
        Ok(())
    }

    #[test]
    fn test_switching_library_replaces_commands() -> Result<()> {
        let dir = config_dir()?;
        // Config > Set AT Library > Legacy.json (listed first), back, Get ID, Send
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "6", "3", "1", "", "0", "1", "", "4", "FF", "", "0"],
        );

        result?;
        assert_eq!(transport.commands(), vec!["ATI7", "AT$SS=FF"]);
        assert_eq!(
            JsonConfigStore::new(dir.path()).load()?.at_library,
            "Legacy.json"
        );
        Ok(())
    }

    #[test]
    fn test_baud_rate_is_validated_and_persisted() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "6", "1", "fast", "0", "-9600", "19200", "", "0", "2", "", "0"],
        );

        result?;
        assert_eq!(JsonConfigStore::new(dir.path()).load()?.baud_rate, 19200);
        assert_eq!(transport.calls.borrow()[0].baud_rate, 19200);
        Ok(())
    }

    #[test]
    fn test_change_device_stays_in_session() -> Result<()> {
        let dir = config_dir()?;
        let (result, transport, _) = run_script(
            &dir,
            vec!["/dev/ttyUSB0", "/dev/ttyUSB1"],
            &["1", "6", "4", "2", "", "0", "1", "", "0"],
        );

        result?;
        assert_eq!(transport.calls.borrow()[0].device, "/dev/ttyUSB1");
        let record = fs::read_to_string(dir.path().join("config.json"))?;
        assert!(!record.contains("ttyUSB"));
        Ok(())
    }

    #[test]
    fn test_login_details_kept_in_memory() -> Result<()> {
        let dir = config_dir()?;
        let transport = RecordingTransport::default();
        let scanner = FixedScanner(vec!["/dev/ttyUSB0"]);
        let mut shell = Shell::new(
            dir.path(),
            Timeouts::default(),
            ScriptedPrompter::new(&["1", "6", "2", "alice", "s3cret", "", "0", "0"]),
            &transport,
            &scanner,
        );

        shell.run()?;

        let credentials = shell
            .context()
            .credentials
            .as_ref()
            .context("credentials not stored")?;
        assert_eq!(credentials.username, "alice");
        assert!(credentials.has_password());
        assert!(!format!("{credentials:?}").contains("s3cret"));

        let record = fs::read_to_string(dir.path().join("config.json"))?;
        assert!(!record.contains("alice"));
        Ok(())
    }

    #[test]
    fn test_about_then_back() -> Result<()> {
        let dir = config_dir()?;
        fs::write(dir.path().join("about.txt"), "Sigfox CLI")?;
        let (result, transport, remaining) =
            run_script(&dir, vec!["/dev/ttyUSB0"], &["1", "6", "5", "", "0", "0"]);

        result?;
        assert_eq!(remaining, 0);
        assert!(transport.commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_corrupt_library_is_fatal() -> Result<()> {
        let dir = config_dir()?;
        fs::write(
            dir.path().join("AT_Libraries").join("Wisol.json"),
            r#"{"Commands":{"ID":"AT$I=10"}}"#,
        )?;
        let (result, transport, _) = run_script(&dir, vec!["/dev/ttyUSB0"], &["1", "1", "", "0"]);

        assert!(result.is_err());
        assert!(transport.commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_change_device_without_ports_is_fatal() -> Result<()> {
        let dir = config_dir()?;
        let transport = RecordingTransport::default();
        let scanner = SequencedScanner(RefCell::new(VecDeque::from([vec!["/dev/ttyUSB0"]])));
        let mut shell = Shell::new(
            dir.path(),
            Timeouts::default(),
            ScriptedPrompter::new(&["1", "6", "4", "0", "0"]),
            &transport,
            &scanner,
        );

        let error = shell.run().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(error.contains("No devices found"));
        assert!(transport.commands().is_empty());
        // Neither the config menu nor the main menu came back
        assert_eq!(shell.prompter.remaining(), 2);
        Ok(())
    }

    #[test]
    fn test_incomplete_library_is_refused() -> Result<()> {
        let dir = config_dir()?;
        // Sorts ahead of Legacy.json and Wisol.json, so it is entry 1
        fs::write(
            dir.path().join("AT_Libraries").join("Broken.json"),
            r#"{"Commands":{"ID":"AT$X","PAC":"AT$Y","Version":"AT$Z"}}"#,
        )?;
        let (result, transport, remaining) = run_script(
            &dir,
            vec!["/dev/ttyUSB0"],
            &["1", "6", "3", "1", "", "0", "1", "", "0"],
        );

        result?;
        assert_eq!(remaining, 0);
        assert_eq!(
            JsonConfigStore::new(dir.path()).load()?.at_library,
            "Wisol.json"
        );
        assert_eq!(transport.commands(), vec!["AT$I=10"]);
        Ok(())
    }

    #[test]
    fn test_corrupt_config_is_fatal_at_startup() -> Result<()> {
        let dir = config_dir()?;
        fs::write(dir.path().join("config.json"), "not json")?;
        let answers = ["1", "1", "", "0"];
        let (result, transport, remaining) = run_script(&dir, vec!["/dev/ttyUSB0"], &answers);

        let error = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(error.contains("config.json"));
        assert!(transport.commands().is_empty());
        // Failed before the device list was shown
        assert_eq!(remaining, answers.len());
        Ok(())
    }

    #[test]
    fn test_missing_library_is_fatal_at_startup() -> Result<()> {
        let dir = config_dir()?;
        fs::write(
            dir.path().join("config.json"),
            r#"{"BaudRate": 9600, "AT_Library": "Gone.json"}"#,
        )?;
        let answers = ["1", "1", "", "0"];
        let (result, transport, remaining) = run_script(&dir, vec!["/dev/ttyUSB0"], &answers);

        let error = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(error.contains("Gone.json"));
        assert!(transport.commands().is_empty());
        assert_eq!(remaining, answers.len());
        Ok(())
    }
}

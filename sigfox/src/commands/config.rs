use crate::output::{library_table, settings_table};
use crate::prompt::{MenuItem, Prompter, ask, pause, select, select_from_list};
use crate::shell::{Credentials, Shell};
use crate::utils::{print_error, print_info, print_success, print_warning};
use anyhow::{Context, Result, bail};
use colored::*;
use sigfox_core::{ConfigStore, PortScanner, Transact};
use std::fs;
use tracing::warn;

/// Banner shown by the About entry, relative to the config dir
const ABOUT_FILE: &str = "about.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigAction {
    SetBaudRate,
    SetLoginDetails,
    SetAtLibrary,
    ChangeDevice,
    About,
    Back,
}

const CONFIG_MENU: [MenuItem<ConfigAction>; 6] = [
    MenuItem {
        selector: 1,
        label: "Set Baud Rate",
        action: ConfigAction::SetBaudRate,
    },
    MenuItem {
        selector: 2,
        label: "Set Login Details",
        action: ConfigAction::SetLoginDetails,
    },
    MenuItem {
        selector: 3,
        label: "Set AT Library",
        action: ConfigAction::SetAtLibrary,
    },
    MenuItem {
        selector: 4,
        label: "Change Device",
        action: ConfigAction::ChangeDevice,
    },
    MenuItem {
        selector: 5,
        label: "About",
        action: ConfigAction::About,
    },
    MenuItem {
        selector: 0,
        label: "Back",
        action: ConfigAction::Back,
    },
];

fn parse_baud_rate(input: &str) -> Result<u32, String> {
    match input.parse::<u32>() {
        Ok(baud_rate) if baud_rate > 0 => Ok(baud_rate),
        _ => Err(format!("'{input}' is not a positive integer")),
    }
}

impl<P, T, S> Shell<'_, P, T, S>
where
    P: Prompter,
    T: Transact + ?Sized,
    S: PortScanner + ?Sized,
{
    /// The configuration menu; every action but Back returns here
    pub(crate) fn config_menu(&mut self) -> Result<()> {
        loop {
            match select(&mut self.prompter, "Config:", &CONFIG_MENU)? {
                ConfigAction::Back => return Ok(()),
                ConfigAction::SetBaudRate => self.set_baud_rate()?,
                ConfigAction::SetLoginDetails => self.set_login_details()?,
                ConfigAction::SetAtLibrary => self.set_at_library()?,
                ConfigAction::ChangeDevice => self.change_device()?,
                ConfigAction::About => self.show_about()?,
            }
            pause(&mut self.prompter)?;
        }
    }

    fn set_baud_rate(&mut self) -> Result<()> {
        let baud_rate = ask(&mut self.prompter, "Baud rate:", parse_baud_rate)?;
        self.store
            .set_baud_rate(baud_rate)
            .context("Failed to save the baud rate")?;
        print_success(&format!("Baud rate set to {baud_rate}"));
        Ok(())
    }

    fn set_login_details(&mut self) -> Result<()> {
        let username = self.prompter.read_line("Username:")?;
        let password = self.prompter.read_secret("Password:")?;
        self.context.credentials = Some(Credentials::new(username, password));
        print_success("Login details stored for this session only");
        Ok(())
    }

    fn set_at_library(&mut self) -> Result<()> {
        let current = self.store.load().context("Failed to read settings")?.at_library;
        let names = self.catalog.list()?;
        if names.is_empty() {
            print_warning(&format!(
                "No AT libraries installed in {}",
                self.catalog.dir().display()
            ));
            return Ok(());
        }

        println!("{table}", table = library_table(&names, &current));
        let title = format!("Current Library: {current}\nSelect:");
        let chosen = select_from_list(&mut self.prompter, &title, &names)?;

        // Refuse to persist a library that would fail on the next command
        if let Err(e) = self.catalog.load(chosen) {
            warn!("{e}");
            print_error(&format!("Cannot use {chosen}: {e}"));
            return Ok(());
        }

        self.store
            .set_at_library(chosen)
            .context("Failed to save the AT library")?;
        print_success(&format!("AT library set to {chosen}"));
        Ok(())
    }

    fn change_device(&mut self) -> Result<()> {
        // Losing every port mid-session is as fatal as finding none at startup
        let Some(device) = self.choose_device()? else {
            bail!("No devices found...");
        };
        print_success(&format!("Using device {device}"));
        self.context.device = Some(device);
        Ok(())
    }

    fn show_about(&mut self) -> Result<()> {
        let about_path = self.config_dir.join(ABOUT_FILE);
        match fs::read_to_string(&about_path) {
            Ok(artwork) => println!("{}", artwork.magenta()),
            Err(e) => {
                warn!("Could not read {}: {e}", about_path.display());
                print_info("sigfox - configure and exercise Sigfox modules over UART");
            }
        }

        let settings = self.store.load().context("Failed to read settings")?;
        let signed_in = self.context.credentials.as_ref().map(|credentials| {
            if credentials.has_password() {
                format!("{} (password set)", credentials.username)
            } else {
                credentials.username.clone()
            }
        });
        println!(
            "{table}",
            table = settings_table(
                &settings,
                self.context.device.as_deref(),
                signed_in.as_deref(),
                self.timeouts
            )
        );
        Ok(())
    }
}

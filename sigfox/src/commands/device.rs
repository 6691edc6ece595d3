use crate::prompt::{Prompter, ask};
use crate::utils::{print_error, print_response};
use indicatif::{ProgressBar, ProgressStyle};
use sigfox_core::{DeviceSession, Payload, Response, SerialError, Transact};
use std::io;
use std::time::Duration;
use tracing::warn;

/// Operations that talk to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    GetId,
    GetPac,
    GetVersion,
    SendMessage,
    CustomCommand,
}

pub fn handle_device<T, P>(
    session: &DeviceSession<'_, T>,
    action: DeviceAction,
    prompter: &mut P,
) -> io::Result<()>
where
    T: Transact + ?Sized,
    P: Prompter + ?Sized,
{
    let target = target_label(session);
    let result = match action {
        DeviceAction::GetId => with_spinner(&target, || session.device_id()),
        DeviceAction::GetPac => with_spinner(&target, || session.pac()),
        DeviceAction::GetVersion => with_spinner(&target, || session.library_version()),
        DeviceAction::SendMessage => {
            let payload = ask(prompter, "Message (Hexadecimal):", Payload::parse)?;
            with_spinner(&target, || session.send_message(&payload))
        }
        DeviceAction::CustomCommand => {
            let command = prompter.read_line("Custom:")?;
            with_spinner(&target, || session.custom_command(&command))
        }
    };

    report(result);
    Ok(())
}

fn target_label<T: Transact + ?Sized>(session: &DeviceSession<'_, T>) -> String {
    format!("{} at {} baud", session.device(), session.baud_rate())
}

fn with_spinner<R>(target: &str, operation: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Waiting for {target}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = operation();
    spinner.finish_and_clear();
    result
}

fn report(result: Result<Response, SerialError>) {
    match result {
        Ok(response) => {
            if !response.is_terminated() && !response.is_empty() {
                warn!("Response was cut off by the read timeout");
            }
            print_response(&response);
        }
        Err(e) => {
            warn!("{e}");
            print_error("Could not connect to device...");
        }
    }
}

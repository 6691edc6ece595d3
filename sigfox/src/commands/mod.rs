mod config;
mod device;

pub use device::{DeviceAction, handle_device};

use crate::prompt::MenuItem;

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    Device(DeviceAction),
    Config,
    Exit,
}

pub const MAIN_MENU: [MenuItem<MainAction>; 7] = [
    MenuItem {
        selector: 1,
        label: "Get ID",
        action: MainAction::Device(DeviceAction::GetId),
    },
    MenuItem {
        selector: 2,
        label: "Get PAC",
        action: MainAction::Device(DeviceAction::GetPac),
    },
    MenuItem {
        selector: 3,
        label: "Get Library Version",
        action: MainAction::Device(DeviceAction::GetVersion),
    },
    MenuItem {
        selector: 4,
        label: "Send Message",
        action: MainAction::Device(DeviceAction::SendMessage),
    },
    MenuItem {
        selector: 5,
        label: "Custom Command",
        action: MainAction::Device(DeviceAction::CustomCommand),
    },
    MenuItem {
        selector: 6,
        label: "Config",
        action: MainAction::Config,
    },
    MenuItem {
        selector: 0,
        label: "Exit",
        action: MainAction::Exit,
    },
];

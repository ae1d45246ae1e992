use voxline_core::SessionConfig;

/// A control bar button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Microphone,
    Camera,
    ScreenShare,
    Chat,
    Leave,
}

impl Control {
    /// Display order, left to right
    pub const VALUES: &[Control] = &[Control::Microphone, Control::Camera, Control::ScreenShare, Control::Chat, Control::Leave];

    pub fn as_str(&self) -> &'static str {
        match self {
            Control::Microphone => "microphone",
            Control::Camera => "camera",
            Control::ScreenShare => "screen-share",
            Control::Chat => "chat",
            Control::Leave => "leave",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Control::Microphone => "Mic",
            Control::Camera => "Camera",
            Control::ScreenShare => "Share",
            Control::Chat => "Chat",
            Control::Leave => "Leave",
        }
    }

    /// Key that triggers the control while the composer is closed
    pub fn key(&self) -> char {
        match self {
            Control::Microphone => 'm',
            Control::Camera => 'v',
            Control::ScreenShare => 's',
            Control::Chat => 'c',
            Control::Leave => 'q',
        }
    }
}

/// Which controls the session offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCapabilities {
    pub leave: bool,
    pub microphone: bool,
    pub chat: bool,
    pub camera: bool,
    pub screen_share: bool,
}

impl ControlCapabilities {
    /// Capabilities for a session: leave and microphone always, chat when chat
    /// input is supported, camera and screen share when video input is
    pub fn from_session(config: &SessionConfig) -> Self {
        Self {
            leave: true,
            microphone: true,
            chat: config.supports_chat_input,
            camera: config.supports_video_input,
            screen_share: config.supports_video_input,
        }
    }

    pub fn allows(&self, control: Control) -> bool {
        match control {
            Control::Leave => self.leave,
            Control::Microphone => self.microphone,
            Control::Chat => self.chat,
            Control::Camera => self.camera,
            Control::ScreenShare => self.screen_share,
        }
    }

    /// Enabled controls in display order
    pub fn enabled(&self) -> Vec<Control> {
        Control::VALUES.iter().copied().filter(|c| self.allows(*c)).collect()
    }
}

/// Requests coming out of the control bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    ToggleMicrophone,
    ToggleCamera,
    ToggleScreenShare,
    ToggleChat,
    SendChat(String),
    Leave,
}

impl ControlAction {
    /// Control that must be enabled for this action to take effect
    pub fn control(&self) -> Control {
        match self {
            ControlAction::ToggleMicrophone => Control::Microphone,
            ControlAction::ToggleCamera => Control::Camera,
            ControlAction::ToggleScreenShare => Control::ScreenShare,
            ControlAction::ToggleChat | ControlAction::SendChat(_) => Control::Chat,
            ControlAction::Leave => Control::Leave,
        }
    }

    pub fn for_control(control: Control) -> Self {
        match control {
            Control::Microphone => ControlAction::ToggleMicrophone,
            Control::Camera => ControlAction::ToggleCamera,
            Control::ScreenShare => ControlAction::ToggleScreenShare,
            Control::Chat => ControlAction::ToggleChat,
            Control::Leave => ControlAction::Leave,
        }
    }
}

/// Local media toggles mirrored to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaState {
    pub microphone: bool,
    pub camera: bool,
    pub screen_share: bool,
}

impl Default for MediaState {
    fn default() -> Self {
        Self { microphone: true, camera: false, screen_share: false }
    }
}

impl MediaState {
    pub fn is_on(&self, control: Control) -> Option<bool> {
        match control {
            Control::Microphone => Some(self.microphone),
            Control::Camera => Some(self.camera),
            Control::ScreenShare => Some(self.screen_share),
            Control::Chat | Control::Leave => None,
        }
    }
}

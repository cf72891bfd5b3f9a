// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filters::{DateField, MultiField};
use crate::model::FilterControl;

/// How a filter control edits its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Multi(MultiField),
    Verification,
    Status,
    Dates(DateField),
}

impl FilterControl {
    pub const fn selector(self) -> SelectorKind {
        match self {
            Self::Name => SelectorKind::Multi(MultiField::Names),
            Self::EmailAddress => SelectorKind::Multi(MultiField::Emails),
            Self::MobileNumber => SelectorKind::Multi(MultiField::Mobiles),
            Self::Domain => SelectorKind::Multi(MultiField::Domains),
            Self::VerificationStatus => SelectorKind::Verification,
            Self::Status => SelectorKind::Status,
            Self::DateRegistered => SelectorKind::Dates(DateField::Registered),
            Self::DateLastActive => SelectorKind::Dates(DateField::LastActive),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Selector(FilterControl),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub focus: FilterControl,
    pub overlay: Option<Overlay>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            focus: FilterControl::Name,
            overlay: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    FocusNext,
    FocusPrev,
    OpenSelector,
    CloseOverlay,
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FocusChanged(FilterControl),
    OverlayChanged(Option<Overlay>),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::FocusNext => self.rotate_focus(1),
            AppCommand::FocusPrev => self.rotate_focus(-1),
            AppCommand::OpenSelector => {
                self.overlay = Some(Overlay::Selector(self.focus));
                vec![AppEvent::OverlayChanged(self.overlay)]
            }
            AppCommand::CloseOverlay => {
                if self.overlay.is_none() {
                    return Vec::new();
                }
                self.overlay = None;
                vec![AppEvent::OverlayChanged(None)]
            }
            AppCommand::ToggleHelp => {
                self.overlay = match self.overlay {
                    Some(Overlay::Help) => None,
                    _ => Some(Overlay::Help),
                };
                vec![AppEvent::OverlayChanged(self.overlay)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_focus(&mut self, delta: isize) -> Vec<AppEvent> {
        let controls = FilterControl::ALL;
        let current = controls
            .iter()
            .position(|control| *control == self.focus)
            .unwrap_or(0) as isize;
        let len = controls.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.focus = controls[next];
        vec![AppEvent::FocusChanged(self.focus)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, Overlay, SelectorKind};
    use crate::filters::{DateField, MultiField};
    use crate::model::FilterControl;

    #[test]
    fn focus_rotation_wraps() {
        let mut state = AppState {
            focus: FilterControl::DateLastActive,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::FocusNext);
        assert_eq!(state.focus, FilterControl::Name);
        assert_eq!(events, vec![AppEvent::FocusChanged(FilterControl::Name)]);

        state.dispatch(AppCommand::FocusPrev);
        assert_eq!(state.focus, FilterControl::DateLastActive);
    }

    #[test]
    fn open_and_close_selector() {
        let mut state = AppState {
            focus: FilterControl::Domain,
            ..AppState::default()
        };

        let opened = state.dispatch(AppCommand::OpenSelector);
        assert_eq!(
            opened,
            vec![AppEvent::OverlayChanged(Some(Overlay::Selector(
                FilterControl::Domain
            )))]
        );

        let closed = state.dispatch(AppCommand::CloseOverlay);
        assert_eq!(closed, vec![AppEvent::OverlayChanged(None)]);
        assert!(state.dispatch(AppCommand::CloseOverlay).is_empty());
    }

    #[test]
    fn help_toggles() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::ToggleHelp);
        assert_eq!(state.overlay, Some(Overlay::Help));
        state.dispatch(AppCommand::ToggleHelp);
        assert_eq!(state.overlay, None);
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::SetStatus("loading".to_owned()));
        assert_eq!(events, vec![AppEvent::StatusUpdated("loading".to_owned())]);
        assert_eq!(state.status_line.as_deref(), Some("loading"));
        state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn controls_map_to_selectors() {
        assert_eq!(
            FilterControl::Name.selector(),
            SelectorKind::Multi(MultiField::Names)
        );
        assert_eq!(
            FilterControl::DateLastActive.selector(),
            SelectorKind::Dates(DateField::LastActive)
        );
        assert_eq!(FilterControl::Status.selector(), SelectorKind::Status);
    }
}

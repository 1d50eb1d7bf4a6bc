// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Data-type tags exchanged between the built-in workspace panes.
//!
//! Any string is a valid tag; these are the ones the stock panes declare.

/// A single email (selection in the list, contents in the detail pane).
pub const EMAIL_DATA: &str = "EMAIL_DATA";
/// The set of emails currently listed.
pub const EMAIL_LIST: &str = "EMAIL_LIST";
/// The selected folder / mailbox.
pub const FOLDER_DATA: &str = "FOLDER_DATA";
/// An active search query.
pub const SEARCH_QUERY: &str = "SEARCH_QUERY";
/// Account or display settings.
pub const SETTINGS_DATA: &str = "SETTINGS_DATA";
/// A contact record.
pub const CONTACT_DATA: &str = "CONTACT_DATA";
/// A conversation thread.
pub const THREAD_DATA: &str = "THREAD_DATA";

//! Abstract dialog service for host-shell interaction.
//!
//! This module provides a trait-based abstraction for the native dialogs a
//! desktop shell shows on behalf of the note store (save pickers,
//! confirmation prompts, error boxes).
//!
//! The design allows:
//! - The core create/delete flows stay testable without a UI toolkit
//! - Each host shell (Electron-style desktop, tests, future mobile hosts)
//!   supplies its own implementation
//! - Dismissing a dialog is an ordinary answer, never an error

use std::path::PathBuf;

/// Trait for native dialog implementations.
///
/// A cancelled or dismissed dialog is reported through the return value
/// (`None` / `false`), not through an error: the user changing their mind is
/// a benign outcome and callers translate it into a benign result.
///
/// # Example
///
/// ```ignore
/// use notemarkcore::dialogs::DialogService;
///
/// async fn ask(dialogs: &impl DialogService) -> bool {
///     dialogs.confirm("Are you sure you want to delete Ideas.md?").await
/// }
/// ```
pub trait DialogService: Send + Sync {
    /// Show a save dialog seeded with a default file name.
    ///
    /// # Arguments
    /// * `default_name` - Suggested file name (e.g., "Untitled.md")
    ///
    /// # Returns
    /// * `Some(path)` - The path the user chose
    /// * `None` - The user cancelled the dialog
    fn choose_save_path(
        &self,
        default_name: &str,
    ) -> impl std::future::Future<Output = Option<PathBuf>> + Send;

    /// Ask the user a yes/no question.
    ///
    /// # Arguments
    /// * `message` - Question to display (e.g., "Are you sure you want to delete Ideas.md?")
    ///
    /// # Returns
    /// * `true` - The user accepted
    /// * `false` - The user declined or dismissed the dialog
    fn confirm(&self, message: &str) -> impl std::future::Future<Output = bool> + Send;

    /// Show an error notice to the user.
    ///
    /// Used when an operation is rejected for a reason the user can fix,
    /// such as choosing a save location outside the notes directory.
    fn notify_error(&self, message: &str) -> impl std::future::Future<Output = ()> + Send;
}

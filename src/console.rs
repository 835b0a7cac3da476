// Menu-driven text interface
// Generic over the input and output streams so sessions can be scripted
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

use crate::report;
use crate::state::{ComplaintStatus, ComplaintStore, IssueCategory, RestoreOutcome};

/// Targets offered when changing a status; SUBMITTED is never offered
const STATUS_TARGETS: [ComplaintStatus; 2] = [ComplaintStatus::InReview, ComplaintStatus::Closed];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Expected a number, got '{0}'")]
    NotANumber(String),
    #[error("Selection {value} is outside 1-{max}")]
    OutOfRange { value: i64, max: usize },
    #[error("End of input")]
    Eof,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type InputResult<T> = Result<T, InputError>;

enum MenuFlow {
    Continue,
    Exit,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user shuts down or input ends
    pub fn run(&mut self, store: &mut ComplaintStore) -> io::Result<()> {
        writeln!(self.output, "==================================================")?;
        writeln!(self.output, "  COMMUNITY COMPLAINT LOGGER & PATTERN ANALYZER")?;
        writeln!(self.output, "==================================================")?;

        loop {
            match self.step(store) {
                Ok(MenuFlow::Continue) => {}
                Ok(MenuFlow::Exit) => return Ok(()),
                Err(InputError::NotANumber(_)) | Err(InputError::OutOfRange { .. }) => {
                    writeln!(
                        self.output,
                        "\nInput Error: Please enter a valid number for your choice."
                    )?;
                }
                Err(InputError::Eof) => {
                    log::info!("Input closed, shutting down");
                    self.close_application(store)?;
                    return Ok(());
                }
                Err(InputError::Io(e)) => return Err(e),
            }
        }
    }

    fn step(&mut self, store: &mut ComplaintStore) -> InputResult<MenuFlow> {
        self.show_main_menu()?;
        let choice: i64 = self.read_number("Enter your menu selection (1-6): ")?;

        match choice {
            1 => {
                let result = self.log_new_complaint(store);
                let message = "Invalid input for Zone Number or Category. Please try again.";
                self.recover(result, message)?;
            }
            2 => self.display_all_complaints(store)?,
            3 => {
                let result = self.change_complaint_status(store);
                self.recover(result, "Invalid input for Tracking ID. Update failed.")?;
            }
            4 => self.show_trend_report(store)?,
            5 => {
                let result = self.handle_data_menu(store);
                self.recover(result, "Invalid Input. Returning to main menu.")?;
            }
            6 => {
                self.close_application(store)?;
                return Ok(MenuFlow::Exit);
            }
            _ => writeln!(
                self.output,
                "\nUnknown selection. Please enter a number from the menu."
            )?,
        }
        Ok(MenuFlow::Continue)
    }

    fn show_main_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- COMPLAINT TRACKING SYSTEM ---")?;
        writeln!(self.output, "1. Log New Complaint")?;
        writeln!(self.output, "2. View All Active & Closed Complaints")?;
        writeln!(self.output, "3. Change Complaint Status (Review/Close)")?;
        writeln!(self.output, "4. Generate Trend Report (Analyze Hotspots)")?;
        writeln!(self.output, "5. Manual Data Backup/Restore (File I/O)")?;
        writeln!(self.output, "6. Shut Down Application")?;
        writeln!(self.output, "---------------------------------")
    }

    fn log_new_complaint(&mut self, store: &mut ComplaintStore) -> InputResult<()> {
        writeln!(self.output, "\n--- NEW COMPLAINT LOG ---")?;
        let zone_number: i32 = self.read_number("Enter Zone Number (e.g., 1-10): ")?;
        let details = self.prompt("Enter Complaint Details (brief description): ")?;

        writeln!(self.output, "\nSelect Category:")?;
        for (i, category) in IssueCategory::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, category)?;
        }
        let choice = match self.choose("Enter the category number: ", IssueCategory::ALL.len()) {
            Ok(choice) => choice,
            Err(InputError::OutOfRange { .. }) => {
                writeln!(self.output, "Invalid category selection. Operation cancelled.")?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let category = IssueCategory::ALL[choice - 1];
        match store.log_complaint(zone_number, details, category) {
            Some(tracking_id) => {
                writeln!(self.output, "New complaint logged. Tracking ID: {}", tracking_id)?
            }
            None => writeln!(self.output, "No tracking IDs left. Complaint not logged.")?,
        }
        Ok(())
    }

    fn display_all_complaints(&mut self, store: &ComplaintStore) -> io::Result<()> {
        writeln!(self.output, "\n--- FULL COMPLAINTS LIST ---")?;
        let complaints = store.list_all();
        if complaints.is_empty() {
            return writeln!(self.output, "No complaints currently logged in the system.");
        }

        for complaint in complaints {
            writeln!(self.output, "{}", complaint)?;
        }
        Ok(())
    }

    fn change_complaint_status(&mut self, store: &mut ComplaintStore) -> InputResult<()> {
        writeln!(self.output, "\n--- UPDATE COMPLAINT STATUS ---")?;
        let tracking_id: u32 = self.read_number("Enter the Tracking ID to update: ")?;

        writeln!(self.output, "\nSelect New Status:")?;
        for (i, status) in STATUS_TARGETS.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, status)?;
        }
        let choice = match self.choose("Enter status number (1 or 2): ", STATUS_TARGETS.len()) {
            Ok(choice) => choice,
            Err(InputError::OutOfRange { .. }) => {
                writeln!(self.output, "Invalid status selection. Update cancelled.")?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let status = STATUS_TARGETS[choice - 1];
        if store.update_status(tracking_id, status) {
            writeln!(
                self.output,
                "Tracking ID {} status updated to {}.",
                tracking_id, status
            )?;
        } else {
            writeln!(self.output, "Complaint Tracking ID {} not found.", tracking_id)?;
        }
        Ok(())
    }

    fn show_trend_report(&mut self, store: &ComplaintStore) -> io::Result<()> {
        writeln!(self.output, "\n--- PATTERN ANALYSIS: OPEN COMPLAINT TRENDS ---")?;
        writeln!(self.output, "Counting issues that are SUBMITTED or IN_REVIEW.\n")?;

        let rows = report::rank(&store.trend_report());
        if rows.is_empty() {
            return writeln!(self.output, "No open complaints to analyze.");
        }

        writeln!(self.output, "{:<25} | {}", "PROBLEM CATEGORY", "OPEN COUNT")?;
        writeln!(self.output, "--------------------------|-----------")?;
        for row in rows {
            let flag = if row.hotspot { "(HIGH HOTSPOT!)" } else { "" };
            let line = format!("{:<25} | {:<10} {}", row.category, row.count, flag);
            writeln!(self.output, "{}", line.trim_end())?;
        }
        writeln!(self.output, "--------------------------|-----------")
    }

    fn handle_data_menu(&mut self, store: &mut ComplaintStore) -> InputResult<()> {
        writeln!(self.output, "\n--- DATA PERSISTENCE & BACKUP OPTIONS ---")?;
        writeln!(self.output, "1. Manually Save Current Data to File Backup")?;
        writeln!(self.output, "2. Manually Restore Data From File Backup")?;
        writeln!(self.output, "3. Back to Main Menu")?;

        match self.choose("Enter choice (1-3): ", 3) {
            Ok(1) => match store.save_backup() {
                Ok(()) => writeln!(self.output, "Backup data saved to file.")?,
                Err(e) => writeln!(self.output, "Error writing backup file: {}", e)?,
            },
            Ok(2) => match store.restore_backup() {
                Ok(RestoreOutcome::Restored(count)) => writeln!(
                    self.output,
                    "Backup data loaded from file ({} complaints).",
                    count
                )?,
                Ok(RestoreOutcome::NoBackup) => writeln!(self.output, "No backup file found.")?,
                Err(e) => writeln!(self.output, "Error reading backup file: {}", e)?,
            },
            Ok(_) => {}
            Err(InputError::OutOfRange { .. }) => writeln!(self.output, "Invalid choice.")?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn close_application(&mut self, store: &ComplaintStore) -> io::Result<()> {
        writeln!(self.output, "\n--- SYSTEM SHUTDOWN IN PROGRESS ---")?;

        let failures = store.shutdown();
        if failures.is_empty() {
            writeln!(self.output, "All data synchronized and backed up. Thank you.")?;
        }
        for failure in failures {
            writeln!(self.output, "Shutdown save failed: {}", failure)?;
        }
        self.output.flush()
    }

    // A non-numeric answer aborts the current action only
    fn recover(&mut self, result: InputResult<()>, message: &str) -> InputResult<()> {
        match result {
            Err(InputError::NotANumber(_)) => {
                writeln!(self.output, "{}", message)?;
                Ok(())
            }
            other => other,
        }
    }

    fn prompt(&mut self, text: &str) -> InputResult<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::Eof);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn read_number<T: FromStr>(&mut self, text: &str) -> InputResult<T> {
        let line = self.prompt(text)?;
        let trimmed = line.trim();
        trimmed
            .parse()
            .map_err(|_| InputError::NotANumber(trimmed.to_string()))
    }

    fn choose(&mut self, text: &str, max: usize) -> InputResult<usize> {
        let value: i64 = self.read_number(text)?;
        match usize::try_from(value) {
            Ok(choice) if (1..=max).contains(&choice) => Ok(choice),
            _ => Err(InputError::OutOfRange { value, max }),
        }
    }
}

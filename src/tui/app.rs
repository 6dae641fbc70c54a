use std::path::PathBuf;
use std::time::Instant;

use crate::features::{field_bounds, Field, InputKind, RawInput, RawValue};
use crate::model::Predictor;
use crate::normalize::{encode_sex, ScalingConfig};
use crate::session::{PredictionSession, SaveOutcome};
use crate::tui::theme::ThemeColors;

const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Help,
    Breakdown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

pub struct App {
    pub inputs: RawInput,
    pub session: PredictionSession,
    pub scaling: ScalingConfig,
    pub predictor: Box<dyn Predictor>,
    pub log_path: PathBuf,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub edit_buffer: String,
    pub flash_message: Option<(String, FlashKind, Instant)>,
    pub should_quit: bool,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(
        scaling: ScalingConfig,
        predictor: Box<dyn Predictor>,
        log_path: PathBuf,
        theme: ThemeColors,
    ) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        table_state.select(Some(0));

        Self {
            inputs: Self::default_inputs(scaling.input),
            session: PredictionSession::new(),
            scaling,
            predictor,
            log_path,
            table_state,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            flash_message: None,
            should_quit: false,
            theme,
        }
    }

    /// Every field at its form default, so the first predict always has a full record.
    pub fn default_inputs(kind: InputKind) -> RawInput {
        RawInput::from_pairs(
            Field::ALL
                .iter()
                .map(|f| (*f, field_bounds(*f, kind).default)),
        )
    }

    pub fn selected_field(&self) -> Field {
        let i = self.table_state.selected().unwrap_or(0);
        Field::ALL[i.min(Field::COUNT - 1)]
    }

    pub fn next_row(&mut self) {
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < Field::COUNT => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let i = match self.table_state.selected() {
            Some(0) | None => Field::COUNT - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn show_flash(&mut self, msg: String, kind: FlashKind) {
        self.flash_message = Some((msg, kind, Instant::now()));
    }

    pub fn update_flash(&mut self) {
        if let Some((_, _, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    /// Store a new value for a field. Any shown prediction no longer matches
    /// the form, so it is dropped.
    fn set_value(&mut self, field: Field, value: RawValue) {
        if self.inputs.get(field) != Some(&value) {
            self.inputs.set(field, value);
            self.session.clear();
        }
    }

    /// Enter on a row: the sex label toggles, numeric fields open the editor.
    pub fn start_edit(&mut self) {
        let field = self.selected_field();
        match self.inputs.get(field) {
            Some(RawValue::Label(label)) if field == Field::Sex => {
                let next = if encode_sex(label) == Some(1.0) { "Female" } else { "Male" };
                self.set_value(field, RawValue::Label(next.to_string()));
            }
            current => {
                self.edit_buffer = current.map(|v| v.to_string()).unwrap_or_default();
                self.input_mode = InputMode::Editing;
            }
        }
    }

    pub fn confirm_edit(&mut self) {
        let field = self.selected_field();
        let text = self.edit_buffer.trim().to_string();
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();

        if text.is_empty() {
            self.inputs.remove(field);
            self.session.clear();
            self.show_flash(format!("Cleared {}", field), FlashKind::Info);
            return;
        }

        match RawValue::parse(&text) {
            RawValue::Number(n) if n.is_finite() => self.set_value(field, RawValue::Number(n)),
            RawValue::Label(label) if field == Field::Sex && encode_sex(&label).is_some() => {
                self.set_value(field, RawValue::Label(label))
            }
            _ => self.show_flash(format!("Invalid value for {}: '{}'", field, text), FlashKind::Error),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();
    }

    /// Nudge the selected value by one step; labels toggle instead.
    pub fn step_selected(&mut self, up: bool) {
        let field = self.selected_field();
        let bounds = field_bounds(field, self.scaling.input);
        match self.inputs.get(field) {
            Some(RawValue::Number(n)) => {
                let next = bounds.step_value(*n, up);
                self.set_value(field, RawValue::Number(next));
            }
            Some(RawValue::Label(_)) => self.start_edit(),
            None => self.set_value(field, bounds.default),
        }
    }

    /// Reset every field to its form default.
    pub fn reset_inputs(&mut self) {
        self.inputs = Self::default_inputs(self.scaling.input);
        self.session.clear();
        self.show_flash("Form reset".to_string(), FlashKind::Info);
    }

    pub fn predict(&mut self) {
        let result = self
            .session
            .predict(&self.inputs, &self.scaling, self.predictor.as_ref())
            .map(|record| crate::output::format_prediction(record.prediction));
        match result {
            Ok(value) => self.show_flash(format!("Predicted: {}", value), FlashKind::Success),
            Err(e) => self.show_flash(format!("Error: {}", e), FlashKind::Error),
        }
    }

    pub fn save(&mut self) {
        match self.session.save(&self.log_path) {
            Ok(SaveOutcome::Saved) => {
                let msg = format!("Prediction saved to {}", self.log_path.display());
                self.show_flash(msg, FlashKind::Success);
            }
            Ok(SaveOutcome::NothingToSave) => {
                self.show_flash("Nothing to save yet (press p to predict)".to_string(), FlashKind::Info)
            }
            Err(e) => {
                crate::buffered_eprintln!("Warning: {}", e);
                self.show_flash(format!("Failed to save: {}", e), FlashKind::Error);
            }
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_overlay(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_breakdown(&mut self) {
        if self.session.last_breakdown().is_some() {
            self.input_mode = InputMode::Breakdown;
        } else {
            self.show_flash("No prediction yet".to_string(), FlashKind::Info);
        }
    }
}

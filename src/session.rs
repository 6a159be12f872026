// src/session.rs - One editing session: stores, mode machine and the event dispatch

use std::path::PathBuf;

use image::{GrayImage, RgbImage};
use log::{info, warn};

use crate::config::Config;
use crate::cursor::Cursor;
use crate::errors::{Result, WatermarkError};
use crate::events::{default_binding, Command, KeyCode, PointerButton, PointerEvent, PointerKind};
use crate::image_io::{load_pages, save_pages};
use crate::image_store::ImageStore;
use crate::mask_manipulator::{self as edit, BrushAction, MorphOp};
use crate::mask_store::MaskStore;
use crate::median::step_sample_count;
use crate::mode::{Mode, ModeStateMachine};
use crate::parameters::{ParamField, ParameterStore};
use crate::removal::{LogProgress, ProgressSink, WatermarkRemovalEngine};

const DEFAULT_MASK_FILE: &str = "mask.png";

/// Everything one user's editing cycle touches.
///
/// Handlers run synchronously; a removal run blocks input until it returns.
pub struct EditingSession {
    config: Config,
    images: ImageStore,
    masks: MaskStore,
    cursor: Cursor,
    modes: ModeStateMachine,
    params: ParameterStore,
    engine: WatermarkRemovalEngine,
    threshold_min: u8,
    threshold_max: u8,
    selected_field: ParamField,
    left_down: bool,
    right_down: bool,
    status: String,
}

impl EditingSession {
    pub fn new(pages: Vec<RgbImage>, config: Config) -> Result<Self> {
        config.validate()?;
        let images = ImageStore::from_config(pages, &config)?;
        let (width, height) = images.working_dimensions();
        let params = ParameterStore::new(images.page_count(), config.default_parameters);

        Ok(Self {
            masks: MaskStore::new(width, height),
            cursor: Cursor::from_config(&config),
            modes: ModeStateMachine::new(),
            engine: WatermarkRemovalEngine::from_config(&config),
            threshold_min: config.threshold_min,
            threshold_max: config.threshold_max,
            selected_field: ParamField::RMin,
            left_down: false,
            right_down: false,
            status: String::from("Select the watermark region, then press space"),
            images,
            params,
            config,
        })
    }

    /// Load the configured input (and mask, if any) into a fresh session
    pub fn from_config(config: Config) -> Result<Self> {
        let pages = load_pages(&config.input_path, config.dpi);
        let mask_path = config.mask_path.clone();
        let mut session = Self::new(pages, config)?;
        if let Some(path) = mask_path {
            session.masks.load_mask(path);
        }
        Ok(session)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn masks(&self) -> &MaskStore {
        &self.masks
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn threshold(&self) -> (u8, u8) {
        (self.threshold_min, self.threshold_max)
    }

    pub fn selected_field(&self) -> ParamField {
        self.selected_field
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn mask_file(&self) -> PathBuf {
        self.config
            .mask_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MASK_FILE))
    }

    /// Parameter records live next to the mask
    pub fn params_file(&self) -> PathBuf {
        self.mask_file().with_extension("json")
    }

    /// The mask the current mode shows and acts on
    pub fn effective_mask(&self) -> GrayImage {
        self.masks.effective_mask(self.mode())
    }

    /// Feed a pointer event. Coordinates are in working-image pixels.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let point = (event.x, event.y);
        self.cursor.set_position(event.x, event.y);

        match (self.mode(), event.kind) {
            (Mode::Select, PointerKind::Press(PointerButton::Left)) => {
                self.left_down = true;
                edit::begin_polygon(&mut self.masks, point);
            }
            (Mode::Select, PointerKind::Move) if self.left_down => {
                edit::extend_polygon(&mut self.masks, point);
            }
            (Mode::Select, PointerKind::Release(PointerButton::Left)) => {
                if self.left_down {
                    edit::extend_polygon(&mut self.masks, point);
                }
                self.left_down = false;
                if edit::finish_polygon(&mut self.masks) {
                    self.set_status("Selection added; space to threshold");
                }
            }

            (Mode::Draw, PointerKind::Press(PointerButton::Left)) => {
                self.left_down = true;
                edit::begin_brush(&mut self.masks, &self.cursor, BrushAction::Draw);
            }
            (Mode::Draw, PointerKind::Press(PointerButton::Right)) => {
                self.right_down = true;
                edit::begin_brush(&mut self.masks, &self.cursor, BrushAction::Erase);
            }
            (Mode::Draw, PointerKind::Move) => {
                if self.left_down {
                    edit::brush_stroke(&mut self.masks, &self.cursor, BrushAction::Draw);
                } else if self.right_down {
                    edit::brush_stroke(&mut self.masks, &self.cursor, BrushAction::Erase);
                }
            }
            (Mode::Draw, PointerKind::Wheel(delta)) => {
                self.cursor.adjust_size(delta);
                let size = self.cursor.size();
                self.set_status(format!("Brush size {}", size));
            }

            (_, PointerKind::Release(PointerButton::Left)) => self.left_down = false,
            (_, PointerKind::Release(PointerButton::Right)) => self.right_down = false,
            _ => {}
        }
    }

    /// Resolve a key through the default map and execute it; failures are logged
    pub fn handle_key(&mut self, key: KeyCode) {
        if let Some(command) = default_binding(key, self.mode()) {
            self.run(command);
        }
    }

    /// Execute a command, logging instead of propagating failures
    pub fn run(&mut self, command: Command) {
        if let Err(e) = self.execute(command) {
            warn!("{:?} failed: {}", command, e);
            self.set_status(e.to_string());
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetMode(mode) => self.change_mode(mode)?,
            Command::Advance => self.advance()?,
            Command::CancelThreshold => self.cancel_threshold()?,
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Reset => {
                self.masks.reset();
                self.set_status("Mask reset");
            }
            Command::Erode => self.morph(MorphOp::Erode),
            Command::Dilate => self.morph(MorphOp::Dilate),
            Command::ToggleCursorShape => self.cursor.toggle_shape(),
            Command::PrevPage => {
                self.prev_page();
            }
            Command::NextPage => {
                self.next_page();
            }
            Command::ThresholdMin(delta) => {
                let min = step_u8(self.threshold_min, delta);
                self.set_threshold(min, self.threshold_max);
            }
            Command::ThresholdMax(delta) => {
                let max = step_u8(self.threshold_max, delta);
                self.set_threshold(self.threshold_min, max);
            }
            Command::MedianSamples(delta) => {
                let requested = step_sample_count(self.images.median_sample_count(), delta);
                self.set_median_sample_count(requested)?;
            }
            Command::SelectField(field) => self.selected_field = field,
            Command::NextField => self.selected_field = self.selected_field.next(),
            Command::NudgeField(step) => {
                let value = self.selected_field.get(self.params.current()) + step as f32;
                self.params.set_field(self.selected_field, value);
                let shown = self.selected_field.get(self.params.current());
                self.set_status(format!("{} = {}", self.selected_field.name(), shown));
            }
            Command::ToggleApplySame => {
                let on = self.params.toggle_apply_same_parameters();
                if on {
                    self.params.set_all_parameters_the_same_as_current();
                }
            }
            Command::CopyParamsToAll => self.params.set_all_parameters_the_same_as_current(),
            Command::SaveMask => {
                let path = self.mask_file();
                self.masks.save_mask(&path)?;
                self.set_status(format!("Mask saved to {}", path.display()));
            }
            Command::LoadMask => self.load_mask(self.mask_file()),
            Command::SaveParams => {
                let path = self.params_file();
                self.params.save_json(&path)?;
                info!("Parameters saved to {}", path.display());
            }
            Command::LoadParams => {
                let path = self.params_file();
                self.params.load_json(&path)?;
                info!("Parameters loaded from {}", path.display());
            }
            Command::SavePages => {
                let bytes = self.save_output()?;
                self.set_status(format!("Saved {} bytes to {}", bytes, self.config.output_path));
            }
        }
        Ok(())
    }

    /// Switch mode, applying the layer rules of the mode left and entered.
    ///
    /// Selecting the current mode is a no-op, except that re-selecting DRAW
    /// toggles the brush shape. Leaving ADJUST runs the removal.
    pub fn change_mode(&mut self, to: Mode) -> Result<()> {
        self.change_mode_with(to, &mut LogProgress)
    }

    pub fn change_mode_with(&mut self, to: Mode, progress: &mut dyn ProgressSink) -> Result<()> {
        let from = self.mode();
        if from == to {
            if to == Mode::Draw {
                self.cursor.toggle_shape();
            }
            return Ok(());
        }
        if !ModeStateMachine::can_transition(from, to) {
            return Err(WatermarkError::InvalidTransition { from, to });
        }

        if from == Mode::Adjust {
            self.run_removal(progress)?;
        }

        self.modes.transition(to)?;
        self.left_down = false;
        self.right_down = false;

        match from {
            Mode::Select => self.masks.clear_points(),
            Mode::Threshold => self.masks.reset_temp(),
            Mode::Draw | Mode::Adjust => {}
        }
        if to == Mode::Threshold {
            self.apply_threshold();
        }

        self.set_status(format!("{:?} mode", to));
        Ok(())
    }

    /// The "space" action of each mode
    pub fn advance(&mut self) -> Result<()> {
        self.advance_with(&mut LogProgress)
    }

    pub fn advance_with(&mut self, progress: &mut dyn ProgressSink) -> Result<()> {
        match self.mode() {
            Mode::Threshold => self.commit_threshold(),
            mode => self.change_mode_with(ModeStateMachine::advance_target(mode), progress),
        }
    }

    /// Commit the threshold result and return to SELECT
    pub fn commit_threshold(&mut self) -> Result<()> {
        if self.mode() != Mode::Threshold {
            return Err(WatermarkError::InvalidTransition { from: self.mode(), to: Mode::Select });
        }
        edit::commit(&mut self.masks);
        self.change_mode(Mode::Select)
    }

    /// Drop the threshold result and return to SELECT
    pub fn cancel_threshold(&mut self) -> Result<()> {
        if self.mode() != Mode::Threshold {
            return Err(WatermarkError::InvalidTransition { from: self.mode(), to: Mode::Select });
        }
        info!("Threshold selection discarded");
        self.change_mode(Mode::Select)
    }

    fn apply_threshold(&mut self) {
        edit::apply_threshold(
            &mut self.masks,
            self.images.median_gray(),
            self.threshold_min,
            self.threshold_max,
        );
    }

    /// Update the threshold bounds; the result is recomputed immediately in THRESHOLD mode
    pub fn set_threshold(&mut self, min: u8, max: u8) {
        self.threshold_min = min;
        self.threshold_max = max;
        if self.mode() == Mode::Threshold {
            self.apply_threshold();
        }
        self.set_status(format!("Threshold {}..{}", min, max));
    }

    pub fn set_median_sample_count(&mut self, requested: usize) -> Result<()> {
        self.images.set_median_sample_count(requested)?;
        if self.mode() == Mode::Threshold {
            self.apply_threshold();
        }
        let count = self.images.median_sample_count();
        self.set_status(format!("Median over {} pages", count));
        Ok(())
    }

    fn morph(&mut self, op: MorphOp) {
        let mode = self.mode();
        edit::morph(&mut self.masks, mode, op);
    }

    /// Undo the last snapshot; THRESHOLD re-derives its result from the restored temp layer
    pub fn undo(&mut self) {
        self.masks.undo();
        if self.mode() == Mode::Threshold {
            self.apply_threshold();
        }
    }

    pub fn redo(&mut self) {
        self.masks.redo();
        if self.mode() == Mode::Threshold {
            self.apply_threshold();
        }
    }

    /// Load a mask as an undoable edit
    pub fn load_mask<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        self.masks.save_state();
        if self.masks.load_mask(&path) {
            self.set_status(format!("Mask loaded from {}", path.display()));
        } else {
            self.set_status("Mask not found, using a blank mask");
        }
        if self.mode() == Mode::Threshold {
            self.apply_threshold();
        }
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.images.prev_page();
        self.params.select(self.images.current_page_index());
        moved
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.images.next_page();
        self.params.select(self.images.current_page_index());
        moved
    }

    /// The current working page cleaned with its own parameters
    pub fn preview_current_page(&self) -> RgbImage {
        let mask = self.masks.effective_mask(Mode::Adjust);
        self.engine
            .process_page(self.images.current_working_page(), &mask, self.params.current())
    }

    /// Clean every original page and make the result the new page set
    pub fn run_removal(&mut self, progress: &mut dyn ProgressSink) -> Result<()> {
        let mask = self.masks.effective_mask(Mode::Adjust);
        let cleaned = self.engine.remove(
            self.images.original_pages(),
            &mask,
            self.params.records(),
            progress,
        )?;

        let count = cleaned.len();
        self.images.replace_pages(cleaned)?;
        self.masks.conform_to(self.images.working_dimensions());
        if self.params.len() != count {
            self.params.reset(count);
        }
        self.params.select(self.images.current_page_index());
        self.set_status("Watermark removed; refine again or save");
        info!("Removal finished over {} pages", count);
        Ok(())
    }

    /// Write the current original-resolution pages to the configured output
    pub fn save_output(&self) -> Result<u64> {
        save_pages(
            self.images.original_pages(),
            &self.config.output_path,
            self.config.dpi,
            self.config.jpeg_quality,
        )
    }
}

fn step_u8(value: u8, delta: i32) -> u8 {
    (value as i32 + delta).clamp(0, 255) as u8
}

use crate::config::Config;
use crate::events::{Dispatcher, Event};
use crate::picker::{DatePicker, Navigation};

use super::{Context, Mode, Popup, StatusLine, TextField, Theme};

use unsegen::base::Terminal;
use unsegen::input::{
    Behavior, EditBehavior, Event as InputEvent, Input, Key, Navigatable, NavigateBehavior,
    OperationResult,
};
use unsegen::widget::*;

pub struct App<'a> {
    config: &'a Config,
    context: Context,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, picker: DatePicker) -> App<'a> {
        App {
            config,
            context: Context::new(picker),
        }
    }

    pub fn into_picker(self) -> DatePicker {
        self.context.into_picker()
    }

    fn as_widget<'w>(&'w self, theme: &'w Theme) -> impl Widget + 'w
    where
        'a: 'w,
    {
        let mut layout = VLayout::new();

        layout = match self.context.mode {
            Mode::Edit => layout.widget(self.context.text_input().as_widget()),
            Mode::Normal => layout.widget(TextField::new(&self.context, theme)),
        };

        if self.context.is_popup_open() {
            layout = layout.widget(Popup::new(&self.context, theme));
        }

        layout.widget(StatusLine::new(&self.context, theme))
    }

    /// Runs until the user quits. The terminal is released on return.
    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        log::debug!("Tick rate: {:?}", self.config.tick_rate());

        let mut run = true;

        while run {
            // Handle events
            if let Ok(event) = dispatcher.next() {
                match event {
                    Event::Update => self.context.update(),
                    Event::Input(input) => match self.context.mode {
                        Mode::Normal => {
                            input
                                .chain((Key::Char('q'), || run = false))
                                .chain((Key::Esc, || run = false))
                                .chain(
                                    NavigateBehavior::new(&mut FocusBehaviour(&mut self.context))
                                        .down_on(Key::Char('j'))
                                        .up_on(Key::Char('k'))
                                        .left_on(Key::Char('h'))
                                        .right_on(Key::Char('l'))
                                        .down_on(Key::Down)
                                        .up_on(Key::Up)
                                        .left_on(Key::Left)
                                        .right_on(Key::Right),
                                )
                                .chain(PickerCommands(&mut self.context))
                                .finish();
                        }
                        Mode::Edit => {
                            input
                                .chain((Key::Esc, || self.context.abort_edit()))
                                .chain(
                                    EditBehavior::new(self.context.text_input_mut())
                                        .delete_forwards_on(Key::Delete)
                                        .delete_backwards_on(Key::Backspace)
                                        .left_on(Key::Left)
                                        .right_on(Key::Right),
                                )
                                .chain(CommitBehaviour(&mut self.context))
                                .finish();
                        }
                    },
                }
            } else {
                break;
            }

            // Draw
            let theme = Theme::for_picker(self.context.picker());
            let root = term.create_root_window();
            self.as_widget(&theme).draw(root, RenderingHints::new());
            term.present();
        }

        Ok(())
    }
}

/// Moves the focused day while the popup is open.
struct FocusBehaviour<'a>(&'a mut Context);

impl FocusBehaviour<'_> {
    fn move_by(&mut self, days: i64) -> OperationResult {
        if self.0.is_popup_open() {
            self.0.move_focus(days);
            Ok(())
        } else {
            Err(())
        }
    }
}

impl Navigatable for FocusBehaviour<'_> {
    fn move_down(&mut self) -> OperationResult {
        self.move_by(7)
    }

    fn move_left(&mut self) -> OperationResult {
        self.move_by(-1)
    }

    fn move_right(&mut self) -> OperationResult {
        self.move_by(1)
    }

    fn move_up(&mut self) -> OperationResult {
        self.move_by(-7)
    }
}

struct PickerCommands<'a>(&'a mut Context);

impl Behavior for PickerCommands<'_> {
    fn input(self, input: Input) -> Option<Input> {
        let key = match &input.event {
            InputEvent::Key(key) => key.clone(),
            _ => return Some(input),
        };

        let context = self.0;
        match key {
            Key::Char(' ') => context.toggle_popup(),
            Key::Char('\n') if context.is_popup_open() => context.select_focus(),
            Key::Char('\n') => context.toggle_popup(),
            Key::Char('p') => context.navigate(Navigation::PreviousMonth),
            Key::Char('n') => context.navigate(Navigation::NextMonth),
            Key::Char('P') => context.navigate(Navigation::PreviousYear),
            Key::Char('N') => context.navigate(Navigation::NextYear),
            Key::Char('+') => context.adjust_time(1),
            Key::Char('-') => context.adjust_time(-1),
            Key::Char('t') => context.show_today(),
            Key::Char('w') => context.toggle_week_numbers(),
            Key::Char('i') => context.begin_edit(),
            _ => return Some(input),
        }
        None
    }
}

struct CommitBehaviour<'a>(&'a mut Context);

impl Behavior for CommitBehaviour<'_> {
    fn input(self, input: Input) -> Option<Input> {
        if let InputEvent::Key(Key::Char('\n')) = input.event {
            self.0.commit_edit();
            None
        } else {
            Some(input)
        }
    }
}

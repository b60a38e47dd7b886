extern crate datepick as lib;

use flexi_logger::{FileSpec, Logger};
use lib::events::Dispatcher;
use lib::format::DisplayMode;
use lib::locale::Locale;
use lib::ui::App;
use lib::zone::Zone;
use lib::{DatePicker, DatePickerEvent, DatePickerObserver};
use nix::sys::termios;
use std::io::stdout;
use std::path::PathBuf;
use std::rc::Rc;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(name = "dp", about = "datepick - pick a date in the terminal.")]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(short = "l", long = "locale", help = "locale, e.g. de_DE")]
    pub locale: Option<Locale>,

    #[structopt(short = "z", long = "zone", help = "IANA timezone or 'local'")]
    pub zone: Option<Zone>,

    #[structopt(short = "m", long = "mode", help = "date, time or datetime")]
    pub mode: Option<DisplayMode>,

    #[structopt(short = "w", long = "week-numbers", help = "show ISO week numbers")]
    pub week_numbers: bool,

    #[structopt(short = "d", long = "date", help = "initially selected date")]
    pub date: Option<String>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the month non-interactively"
    )]
    pub show: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let mut options = config.picker_options();
    if let Some(locale) = args.locale {
        options.locale = locale;
    }
    if let Some(zone) = &args.zone {
        options.zone = zone.clone();
    }
    if let Some(mode) = args.mode {
        options.display_mode = mode;
    }
    if args.week_numbers {
        options.week_numbers = true;
    }

    let locale = options.locale;
    let mut picker = DatePicker::new(options);
    if let Some(date) = &args.date {
        picker.commit_text(date)?;
    }

    if args.show {
        print!("{}", picker.grid().render_text(&locale));
        if picker.has_selection() {
            println!("{}", picker.text());
        }
        return Ok(());
    }

    let logged: Rc<dyn DatePickerObserver> = Rc::new(|event: &DatePickerEvent| {
        log::info!("{:?} {}", event.kind(), event.date().to_rfc3339())
    });
    picker.subscribe(logged);

    const STDIN: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDIN)?);

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDIN, termios::SetArg::TCSANOW, &attr);
        }

        println!("datepick ran into a fatal error!");
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let dispatcher = Dispatcher::from_config(&config);
    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let mut app = App::new(&config, picker);
    app.run(dispatcher, term)?;

    let picker = app.into_picker();
    if picker.has_selection() {
        println!("{}", picker.text());
    }

    Ok(())
}

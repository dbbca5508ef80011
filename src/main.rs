use clap::Parser;
use color_eyre::Result;
use daviz::logging::setup_logging;
use daviz::{App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, OpenOptions, Theme};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: &AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let theme = Theme::from_config(&config.theme)?;
    let opts = OpenOptions::from_args_and_config(args, config);
    let mut app = App::new(config, theme, opts);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone()))?;
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        for event in app.poll_debounced(Instant::now()) {
            tx.send(event)?;
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(daviz::APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match ConfigManager::new(daviz::APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Wrote default configuration to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = match AppConfig::load(daviz::APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Logging is optional; the UI still runs when the cache directory is unavailable
    let _log_guard = match CacheManager::new(daviz::APP_NAME) {
        Ok(cache) => setup_logging(&cache, &config.logging, args.log_level.as_deref())
            .map_err(|e| eprintln!("Logging disabled: {}", e))
            .ok(),
        Err(_) => None,
    };

    let terminal = ratatui::init();
    let result = run(terminal, &args, &config);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!(error = %e, "exiting after error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

use std::io::Read;
use std::path::Path;

use log::{warn, LevelFilter};

use destructure::cli::{self, ConfigFile, USAGE};
use destructure::config::Config;
use destructure::script::Session;

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("destructure: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    // ── Load user config ──────────────────────────────────────────────────────
    let rc_path = match &args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(path) => Some(path.clone()),
        ConfigFile::Search => cli::find_user_config(),
    };
    let (config, rc_errors) = match &rc_path {
        Some(path) => match Config::load_file(path) {
            Ok(loaded) => loaded,
            Err(e) => fail(&format!("{}: {e}", path.display())),
        },
        None => (Config::default(), Vec::new()),
    };

    // ── Logging ───────────────────────────────────────────────────────────────
    // RUST_LOG wins over the rc file, which wins over -d.
    let level = config.log_level.unwrap_or(if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();

    if let Some(path) = &rc_path {
        for e in &rc_errors {
            warn!("{}: {e}", path.display());
        }
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let mut session = Session::with_config(&config);

    for stmt in &args.commands {
        let result = session.exec_line(stmt);
        flush(&mut session);
        if let Err(e) = result {
            fail(&e);
        }
    }

    if args.reads_stdin() {
        run_script(&mut session, Path::new("-"));
    }
    for script in &args.scripts {
        run_script(&mut session, script);
    }
}

fn run_script(session: &mut Session, path: &Path) {
    let stdin = path == Path::new("-");
    let name = if stdin {
        "<stdin>".to_owned()
    } else {
        path.display().to_string()
    };
    let src = if stdin {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .map(|_| s)
            .unwrap_or_else(|e| fail(&format!("stdin: {e}")))
    } else {
        std::fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("{name}: {e}")))
    };

    let result = session.exec_script(&src);
    flush(session);
    if let Err(e) = result {
        fail(&format!("{name}: {e}"));
    }
}

fn flush(session: &mut Session) {
    for line in session.output.drain(..) {
        println!("{line}");
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("destructure: {msg}");
    std::process::exit(1);
}

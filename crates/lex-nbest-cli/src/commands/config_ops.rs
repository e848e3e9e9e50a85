use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a settings file before anything reads the settings.
pub fn settings_load(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        lex_nbest::settings::init_custom(content),
        "Error in settings {file}: {}"
    );
}

pub fn settings_export() {
    print!("{}", lex_nbest::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        lex_nbest::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: cost.segment_penalty={}, nbest.max_trials={}, nbest.candidates_per_segment={}, nbest.default_mode={}",
        s.cost.segment_penalty,
        s.nbest.max_trials,
        s.nbest.candidates_per_segment,
        s.nbest.default_mode()
    );
}

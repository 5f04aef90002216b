use std::process;

use seg_core::profile::Profile;
use seg_core::settings::settings;
use seg_core::unicode::nfd;

use super::read_input;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn profile_cmd(text: Option<&str>, mapping: Option<&str>) {
    let input = die!(read_input(text), "Error reading input: {}");
    println!("{}", build_profile(&input, mapping));
}

/// Frequency profile of `text` as TSV.
pub fn build_profile(text: &str, mapping: Option<&str>) -> String {
    let s = settings();
    let mapping = mapping.unwrap_or(&s.profile.mapping_column);
    Profile::from_text(&nfd(text), mapping).to_tsv(&s.profile.null)
}

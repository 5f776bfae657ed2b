//! The `vocalens voices` command.

use vocalens_core::{Config, Voice};

pub fn execute(config: &Config) {
    for voice in Voice::ALL {
        if voice == config.speech.default_voice {
            println!("{voice} (default)");
        } else {
            println!("{voice}");
        }
    }
}

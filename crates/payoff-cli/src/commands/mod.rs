pub mod amortization;
pub mod debt;
pub mod runway;

use serde::de::DeserializeOwned;

use crate::input;

/// Load a typed input from `--input`, then piped stdin. `None` means the
/// caller should build the input from flags.
pub fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_input(path).map(Some);
    }
    input::stdin::read_stdin()
}

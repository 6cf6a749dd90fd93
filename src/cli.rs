use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "Current weather in the terminal";

const LONG_ABOUT: &str = "
TUI for viewing current weather conditions sourced from OpenWeatherMap.

On start `wxnow` looks up your approximate position and shows the weather there. Type a city name
and press Enter to look somewhere else. Passing a city on the command line skips the position
lookup.

An OpenWeatherMap API key is required. Supply it with --api-key, the OPENWEATHER_API_KEY
environment variable, or `api_key` in the config file.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug, Default)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to show instead of the current position (e.g. Paris, \"New York\")")]
    pub city: Option<String>,

    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    /// OpenWeatherMap API key
    pub api_key: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    /// Use this latitude instead of looking up the position
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    /// Use this longitude instead of looking up the position
    pub lon: Option<f64>,

    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    /// Never look up the position
    pub no_locate: bool,

    #[arg(long, value_name = "FILE")]
    /// Config file to read instead of the default one
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    /// Where to write the log
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_fixed_position() {
        let args = Args::try_parse_from(["wxnow", "--lat", "51.5", "--lon", "-0.12"]).unwrap();
        assert_eq!(args.lat, Some(51.5));
        assert_eq!(args.lon, Some(-0.12));
        assert_eq!(args.city, None);
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(Args::try_parse_from(["wxnow", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn test_no_locate_conflicts_with_position() {
        assert!(
            Args::try_parse_from(["wxnow", "--no-locate", "--lat", "1", "--lon", "2"]).is_err()
        );
    }

    #[test]
    fn test_city() {
        let args = Args::try_parse_from(["wxnow", "New York"]).unwrap();
        assert_eq!(args.city.as_deref(), Some("New York"));
        assert!(!args.no_locate);
    }
}

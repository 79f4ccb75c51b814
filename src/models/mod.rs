pub mod config;
pub mod palette;

pub use config::{
    AppConfig, ConfigOrigin, ConnectionSettings, DeviceConfig, TransportKind, DEFAULT_CONFIG_PATH,
};
pub use palette::{NamedColor, Palette, PaletteBook, PaletteColorConfig, PaletteConfig};

mod app;
#[cfg(feature = "audio")]
mod audio;
mod board;
mod surface;

pub use app::App;

use env_logger::{Builder, Env};

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = App::new()?;
    app.run()?;

    Ok(())
}

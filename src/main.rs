// src/main.rs

//! Entry point for the `pocketmenu` launcher.

use pocketmenu::{
    compositor::{Compositor, LaunchRequest, LoopExit},
    config::Config,
    display::{connect_with_fallback, DisplayDriver, HeadlessDisplayDriver},
    input::KeymapInput,
    layers::{Background, BottomBar, ButtonHint, Notice},
    power::{PowerSaver, ScreenState},
    render::RenderContext,
    resources::SkinResources,
    surface::{resolution_supported, select_resolution, PresentationSurface},
    text::{FontDriver, FontdueFontDriver, HeadlessFontDriver, OutlineTextRenderer},
};

use anyhow::{bail, Context, Result};
// Logging
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "pocketmenu.json";

struct Args {
    headless: bool,
    config: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        headless: false,
        config: PathBuf::from(DEFAULT_CONFIG_PATH),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => args.headless = true,
            "--config" => {
                args.config = iter
                    .next()
                    .map(PathBuf::from)
                    .context("--config needs a path")?;
            }
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(args)
}

/// The X11 driver when built with it and a display is reachable, otherwise
/// the headless driver.
fn open_driver(headless: bool) -> Result<Box<dyn DisplayDriver>> {
    #[cfg(feature = "x11")]
    {
        connect_with_fallback::<pocketmenu::display::X11DisplayDriver, HeadlessDisplayDriver>(
            headless,
        )
    }
    #[cfg(not(feature = "x11"))]
    {
        if !headless {
            warn!("Built without a windowing backend; running headless");
        }
        connect_with_fallback::<HeadlessDisplayDriver, HeadlessDisplayDriver>(true)
    }
}

/// The forced size, or the first entry of the priority list the output
/// supports.
fn choose_resolution(driver: &mut dyn DisplayDriver, config: &Config) -> Result<(u32, u32)> {
    if let Some(forced) = config.display.force_resolution {
        info!("Using forced resolution {}x{}", forced.width, forced.height);
        return Ok((forced.width, forced.height));
    }
    let candidates: Vec<(u32, u32)> = config
        .display
        .resolutions
        .iter()
        .map(|r| (r.width, r.height))
        .collect();
    let chosen = select_resolution(&candidates, |w, h| resolution_supported(driver, w, h))
        .with_context(|| format!("No supported resolution among {:?}", candidates))?;
    info!("Selected resolution {}x{}", chosen.0, chosen.1);
    Ok(chosen)
}

fn default_hints() -> Vec<ButtonHint> {
    vec![
        ButtonHint::new("accept", "Launch"),
        ButtonHint::new("cancel", "Back"),
        ButtonHint::new("settings", "Settings"),
    ]
}

/// Builds the layer stack and runs the loop until it exits.
fn run<D: FontDriver + 'static>(
    font: OutlineTextRenderer<D>,
    ctx: &RenderContext,
    surface: &mut PresentationSurface,
    config: &Config,
) -> Result<LoopExit> {
    let font = Rc::new(font);
    let mut resources = SkinResources::new(ctx, config.skin.search_paths.clone());
    let mut compositor = Compositor::new();

    let background = Background::new(
        ctx,
        &mut resources,
        &config.skin,
        surface.width(),
        surface.height(),
    )
    .context("Failed to render the background")?;
    compositor.push(Box::new(background));
    compositor.push(Box::new(BottomBar::new(
        Rc::clone(&font),
        &mut resources,
        &default_hints(),
    )));

    if let Some(notice) = &config.notice {
        let mut layer = Notice::new(Rc::clone(&font), notice.text.clone(), &config.skin.colors);
        if let Some(launch) = &notice.launch {
            let request = LaunchRequest {
                program: launch.program.clone(),
                args: launch.args.clone(),
                working_dir: launch.working_dir.clone(),
            };
            layer = layer.with_launch(request, compositor.launch_signal());
        }
        compositor.push(Box::new(layer));
    }

    let screen = Arc::new(ScreenState::new(config.power.blank_path.clone()));
    let saver = PowerSaver::start(
        screen,
        Duration::from_secs(config.power.screen_timeout_secs),
    );
    let mut input = KeymapInput::from_names(&config.keymap).with_activity(saver.notifier());

    let exit = compositor.run(surface, &mut input);

    if let Some(dir) = &config.display.screenshot_dir {
        let path = dir.join(format!("pocketmenu-{}.png", compositor.frames()));
        if let Err(e) = surface.save_screenshot(&path) {
            warn!("Screenshot failed: {:#}", e);
        }
    }
    Ok(exit)
}

fn launch(request: &LaunchRequest) -> Result<()> {
    info!(
        "Launching {} {:?}",
        request.program.display(),
        request.args
    );
    let mut command = Command::new(&request.program);
    command.args(&request.args);
    if let Some(dir) = &request.working_dir {
        command.current_dir(dir);
    }
    let status = command
        .status()
        .with_context(|| format!("Failed to run {}", request.program.display()))?;
    if !status.success() {
        warn!("{} exited with {}", request.program.display(), status);
    }
    Ok(())
}

/// Main entry point for the `pocketmenu` application.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting pocketmenu...");

    let args = parse_args()?;
    let config = Config::load_or_default(&args.config);

    // --- Display ---
    let ctx = RenderContext::new();
    let mut driver = open_driver(args.headless)?;
    let (width, height) = choose_resolution(driver.as_mut(), &config)?;
    let windowed = config.display.windowed || cfg!(feature = "windowed");
    let mut surface = PresentationSurface::open(
        &ctx,
        driver,
        &config.display.caption,
        width,
        height,
        windowed,
    )
    .context("Failed to open the display")?;

    // --- Fonts and main loop ---
    let exit = if args.headless {
        let font = OutlineTextRenderer::new(HeadlessFontDriver::new(), &config.fonts.stack)?;
        run(font, &ctx, &mut surface, &config)?
    } else {
        match OutlineTextRenderer::new(FontdueFontDriver::new(), &config.fonts.stack) {
            Ok(font) => run(font, &ctx, &mut surface, &config)?,
            Err(e) => {
                error!("No usable font ({:#}); falling back to block glyphs", e);
                let font = OutlineTextRenderer::new(HeadlessFontDriver::new(), &[])?;
                run(font, &ctx, &mut surface, &config)?
            }
        }
    };

    // The window must be gone before anything else takes the screen.
    drop(surface);

    match exit {
        LoopExit::Quit => info!("pocketmenu exited normally."),
        LoopExit::Launch(request) => launch(&request)?,
    }
    Ok(())
}

use anyhow::Context;
use env_logger::Env;
use match_replay::*;

use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<_> = env::args().collect();
    let match_path = args
        .get(1)
        .context("usage: match_replay <match.json> [fps] [config.json]")?;
    let fps: f64 = match args.get(2) {
        Some(fps) => fps.parse().context("fps must be a number")?,
        None => 1.0,
    };
    let config = match args.get(3) {
        Some(path) => ReplayConfig::from_json_str(
            &std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
        )?,
        None => ReplayConfig::default(),
    };

    let data = std::fs::read_to_string(match_path)
        .with_context(|| format!("reading {}", match_path))?;
    let match_data = MatchData::from_json_str(&data)?;

    let mut processor = MatchProcessor::new(&match_data, config)?;
    let mut collector = NDArrayCollector::<f32>::new(true);
    let mut decorator = FrameRateDecorator::new_from_fps(fps, &mut collector);
    processor.process(&mut decorator, 1.0 / fps)?;

    let (meta, array) = collector.get_meta_and_ndarray()?;

    for (i, header) in meta.column_headers.iter().enumerate() {
        println!(
            "{}: {:?}",
            header,
            array
                .slice(::ndarray::s![.., i])
                .iter()
                .cloned()
                .map(float_ord::FloatOrd)
                .max()
                .map(|max| max.0)
        );
    }

    let world = processor.world();
    println!(
        "Final score {}-{} after {:.0}s",
        world.score_home,
        world.score_away,
        processor.current_time()
    );
    println!("Array shape is {:?}", array.shape());
    Ok(())
}

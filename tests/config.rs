use std::path::Path;
use tempfile::tempdir;

use stem_runner::core::device::{resolve, DeviceKind, DeviceSelector};
use stem_runner::{stem_path, ModelType, SeparationConfig, SeparationStrategy};

fn write_config(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn loads_instruments_from_the_training_section() {
    let tmp = tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
audio:
  chunk_size: 261120
training:
  instruments: [vocals, drums, bass, other]
"#,
    );

    let config = SeparationConfig::load(&path).unwrap();
    assert_eq!(
        config.active_instruments(),
        vec!["vocals", "drums", "bass", "other"]
    );
}

#[test]
fn target_instrument_narrows_the_active_set() {
    let tmp = tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
training:
  instruments: [vocals, other]
  target_instrument: vocals
"#,
    );

    let config = SeparationConfig::load(&path).unwrap();
    assert_eq!(config.active_instruments(), vec!["vocals"]);
}

#[test]
fn unknown_target_instrument_is_a_config_error() {
    let tmp = tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
training:
  instruments: [vocals, other]
  target_instrument: drums
"#,
    );

    assert!(SeparationConfig::load(&path).is_err());
}

#[test]
fn stem_paths_use_the_input_base_name() {
    let path = stem_path(Path::new("/out"), Path::new("/music/song.mp3"), "vocals");
    assert_eq!(path, Path::new("/out/song_vocals.wav"));
}

#[test]
fn demucs_family_gets_its_own_strategy() {
    assert_eq!(
        SeparationStrategy::for_model(ModelType::Htdemucs),
        SeparationStrategy::DemucsWindowed
    );
    assert_eq!(
        SeparationStrategy::for_model(ModelType::Mdx23c),
        SeparationStrategy::ChunkOverlapAdd
    );
    assert_eq!(
        SeparationStrategy::for_model(ModelType::BsRoformer),
        SeparationStrategy::ChunkOverlapAdd
    );
}

#[test]
fn missing_accelerator_falls_back_to_cpu() {
    let handle = resolve(&DeviceSelector::Single(1), false);
    assert_eq!(handle.kind, DeviceKind::Cpu);
    assert!(handle.data_parallel.is_none());
}

#[test]
fn multi_device_selection_keeps_the_parallel_ids() {
    let handle = resolve(&DeviceSelector::Multi(vec![0, 1, 2]), true);
    assert_eq!(handle.kind, DeviceKind::Accelerator(0));
    assert_eq!(handle.data_parallel, Some(vec![0, 1, 2]));
}

#[test]
fn selector_from_ids_distinguishes_single_and_multi() {
    assert_eq!(DeviceSelector::from_ids(&[3]), DeviceSelector::Single(3));
    assert_eq!(
        DeviceSelector::from_ids(&[0, 1]),
        DeviceSelector::Multi(vec![0, 1])
    );
    assert_eq!(DeviceSelector::from_ids(&[]), DeviceSelector::Single(0));
}

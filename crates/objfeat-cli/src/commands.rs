//! Command implementations.
//!
//! Each command writes its report to `out` so tests can capture it.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use objfeat_core::{warmup_files, ObjectDataset, ObjfeatConfig, VariantRegistry, DEFAULT_CAPACITY};

use crate::DatasetArgs;

/// Applies command-line overrides on top of the loaded configuration.
pub(crate) fn resolve(config: &ObjfeatConfig, args: &DatasetArgs) -> Result<ObjfeatConfig> {
    let mut config = config.clone();
    if let Some(dir) = &args.dir {
        config.dataset.data_dir = dir.clone();
    }
    if let Some(split) = &args.split {
        config.dataset.split = split.clone();
    }
    if let Some(max_obj) = args.max_obj {
        config.dataset.max_obj = max_obj;
    }
    if let Some(dim) = args.dim {
        config.dataset.dim = dim;
    }
    config.validate()?;
    Ok(config)
}

pub(crate) fn info(config: &ObjfeatConfig, out: &mut impl Write) -> Result<()> {
    let dataset = ObjectDataset::from_config(config)?;
    let selection = dataset.selection();

    writeln!(out, "Dataset:    {}", dataset.dir().display())?;
    writeln!(out, "Split:      {}", dataset.split())?;
    writeln!(out, "Documents:  {}", dataset.index().num_documents())?;
    writeln!(out, "Records:    {}", dataset.len())?;
    writeln!(out, "Max objects:{:>4}", dataset.max_obj())?;
    writeln!(
        out,
        "Variant:    {}{}",
        selection.capacity,
        if selection.suffixed { "" } else { " (default)" }
    )?;
    writeln!(out, "Features:   {}", selection.files.features.display())?;
    writeln!(out, "Mask:       {}", selection.files.mask.display())?;
    writeln!(
        out,
        "Mapped:     {:.1} MiB",
        dataset.store().mapped_bytes() as f64 / (1024.0 * 1024.0)
    )?;
    Ok(())
}

pub(crate) fn variants(config: &ObjfeatConfig, out: &mut impl Write) -> Result<()> {
    let dataset = &config.dataset;
    let registry = VariantRegistry::scan(&dataset.data_dir, &dataset.split)?;

    if registry.is_empty() {
        writeln!(
            out,
            "No variants of '{}' in {}",
            dataset.split,
            dataset.data_dir.display()
        )?;
        return Ok(());
    }

    if let Some(base) = registry.base() {
        writeln!(
            out,
            "{:>6}  {}  (default)",
            DEFAULT_CAPACITY,
            base.features.display()
        )?;
    }
    for (capacity, files) in registry.variants() {
        writeln!(out, "{:>6}  {}", capacity, files.features.display())?;
    }

    match registry.select(dataset.max_obj) {
        Ok(selection) => writeln!(
            out,
            "max_obj={} selects {}",
            dataset.max_obj, selection.capacity
        )?,
        Err(e) => writeln!(out, "max_obj={}: {}", dataset.max_obj, e)?,
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ObjectSummary {
    slot: usize,
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct RecordSummary {
    index: u64,
    document: Option<usize>,
    sentence: Option<u64>,
    slots: usize,
    objects: usize,
    mask: Vec<bool>,
    rows: Vec<ObjectSummary>,
}

pub(crate) fn get(
    config: &ObjfeatConfig,
    index: u64,
    values: usize,
    out: &mut impl Write,
) -> Result<()> {
    let dataset = ObjectDataset::from_config(config)?;
    let record = dataset.get(index)?;
    let location = dataset.index().locate(index);

    let summary = RecordSummary {
        index,
        document: location.map(|l| l.document),
        sentence: location.map(|l| l.sentence),
        slots: record.num_slots(),
        objects: record.num_objects(),
        mask: record.mask().to_vec(),
        rows: record
            .objects()
            .map(|(slot, row)| ObjectSummary {
                slot,
                values: row.iter().take(values).copied().collect(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *out, &summary)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn warmup(config: &ObjfeatConfig, out: &mut impl Write) -> Result<()> {
    let dataset = &config.dataset;
    let selection =
        VariantRegistry::scan(&dataset.data_dir, &dataset.split)?.select(dataset.max_obj)?;

    let bytes = warmup_files(&selection.files)?;

    writeln!(
        out,
        "Warmed {} bytes from {} and {}",
        bytes,
        selection.files.features.display(),
        selection.files.mask.display()
    )?;
    Ok(())
}

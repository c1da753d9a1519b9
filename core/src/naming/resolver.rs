use crate::model::{DisplayColumn, TestRecord, VehicleInfo};
use crate::naming::sanitize::{sanitize_segment, NOT_APPLICABLE};
use crate::prelude::{EmitError, EmitResult, EmitterConfig};
use crate::telemetry::log::LogManager;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The three name segments below the output root, before collision handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    /// `<yy>-<oem>-<number>-<vehicle>`
    pub group: String,
    /// `<group>-<macro_type>`
    pub test_group: String,
    /// `<number>-<display values...>`
    pub leaf: String,
}

impl FolderLayout {
    pub fn parent(&self, root: &Path) -> PathBuf {
        root.join(&self.group).join(&self.test_group)
    }

    pub fn base_path(&self, root: &Path) -> PathBuf {
        self.parent(root).join(&self.leaf)
    }
}

/// Leaf folder chosen for a test, suffix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFolder {
    pub path: PathBuf,
    pub leaf_name: String,
}

/// Derives sanitized, collision-free test folders.
pub struct FolderResolver<'a> {
    config: &'a EmitterConfig,
    logger: LogManager,
}

impl<'a> FolderResolver<'a> {
    /// Fails when `config` could produce characters outside `[A-Za-z0-9_-]`.
    pub fn new(config: &'a EmitterConfig) -> EmitResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: LogManager::new(),
        })
    }

    fn clean(&self, raw: &str) -> String {
        sanitize_segment(raw, &self.config.replacement, &self.config.empty_segment)
    }

    fn vehicle_segment(&self, info: &VehicleInfo) -> String {
        if info.make.trim().is_empty() {
            self.clean(&info.model)
        } else {
            format!("{}_{}", self.clean(&info.make), self.clean(&info.model))
        }
    }

    pub fn group_segment(&self, info: &VehicleInfo) -> String {
        format!(
            "{}-{}-{}-{}",
            self.clean(info.short_year()),
            self.clean(&info.oem),
            self.clean(&info.number),
            self.vehicle_segment(info)
        )
    }

    pub fn leaf_name(&self, info: &VehicleInfo, columns: &[DisplayColumn]) -> String {
        let mut leaf = self.clean(&info.number);
        for column in columns {
            if column.text == NOT_APPLICABLE {
                continue;
            }
            leaf.push('-');
            leaf.push_str(&self.clean(&column.text));
        }
        leaf
    }

    pub fn layout(
        &self,
        info: &VehicleInfo,
        macro_type: &str,
        columns: &[DisplayColumn],
    ) -> FolderLayout {
        let group = self.group_segment(info);
        let test_group = format!("{}-{}", group, self.clean(macro_type));
        FolderLayout {
            group,
            test_group,
            leaf: self.leaf_name(info, columns),
        }
    }

    pub fn layout_for(&self, info: &VehicleInfo, test: &TestRecord) -> FolderLayout {
        self.layout(info, test.macro_type(), test.display_columns())
    }

    /// First free leaf under `root` according to the filesystem alone.
    pub fn resolve(&self, root: &Path, layout: &FolderLayout) -> ResolvedFolder {
        unique_leaf(&layout.parent(root), &layout.leaf, |path| path.exists())
    }

    /// Resolves the leaf for `test` and creates it with its data subfolders.
    pub fn create(
        &self,
        root: &Path,
        info: &VehicleInfo,
        test: &TestRecord,
    ) -> EmitResult<ResolvedFolder> {
        let layout = self.layout_for(info, test);
        let parent = layout.parent(root);
        fs::create_dir_all(&parent).map_err(|err| EmitError::io(&parent, err))?;

        let resolved = self.resolve(root, &layout);
        fs::create_dir(&resolved.path).map_err(|err| EmitError::io(&resolved.path, err))?;
        for sub in [&self.config.channel_dir, &self.config.movie_dir] {
            let dir = resolved.path.join(sub);
            fs::create_dir(&dir).map_err(|err| EmitError::io(&dir, err))?;
        }

        if resolved.leaf_name != layout.leaf {
            self.logger.debug(&format!(
                "{} already taken, using {}",
                layout.leaf, resolved.leaf_name
            ));
        }
        Ok(resolved)
    }
}

fn unique_leaf(parent: &Path, leaf: &str, taken: impl Fn(&Path) -> bool) -> ResolvedFolder {
    let base = parent.join(leaf);
    if !taken(&base) {
        return ResolvedFolder {
            path: base,
            leaf_name: leaf.to_string(),
        };
    }
    let mut suffix = 2usize;
    loop {
        let leaf_name = format!("{}_{}", leaf, suffix);
        let path = parent.join(&leaf_name);
        if !taken(&path) {
            return ResolvedFolder { path, leaf_name };
        }
        suffix += 1;
    }
}

/// Plans a whole batch without touching the disk.
///
/// Leaves handed out earlier in the same plan count as taken, so identical
/// tests get `_2`, `_3`, ... exactly as a sequential run would produce.
pub struct FolderPlanner<'a> {
    resolver: FolderResolver<'a>,
    root: PathBuf,
    reserved: HashSet<PathBuf>,
}

impl<'a> FolderPlanner<'a> {
    pub fn new(config: &'a EmitterConfig, root: impl Into<PathBuf>) -> EmitResult<Self> {
        Ok(Self {
            resolver: FolderResolver::new(config)?,
            root: root.into(),
            reserved: HashSet::new(),
        })
    }

    pub fn plan(&mut self, info: &VehicleInfo, test: &TestRecord) -> ResolvedFolder {
        let layout = self.resolver.layout_for(info, test);
        let reserved = &self.reserved;
        let resolved = unique_leaf(&layout.parent(&self.root), &layout.leaf, |path| {
            reserved.contains(path) || path.exists()
        });
        self.reserved.insert(resolved.path.clone());
        resolved
    }

    pub fn reserved(&self) -> usize {
        self.reserved.len()
    }
}

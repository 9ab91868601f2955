//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use iconstudio::config::StudioConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Temporary studio with its own projects and cache directories
pub struct TestStudio {
    pub temp_dir: TempDir,
    pub config: StudioConfig,
}

impl TestStudio {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config = StudioConfig::with_projects_dir(temp_dir.path().join("projects"));
        Ok(Self { temp_dir, config })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn projects_dir(&self) -> &Path {
        &self.config.projects_dir
    }
}

/// Builder for Android icon pack source trees
#[derive(Default)]
pub struct PackBuilder {
    icons: Vec<(String, Option<String>)>,
    categories: Vec<(String, Vec<String>)>,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an icon named after a preceding comment
    pub fn with_icon(mut self, id: &str) -> Self {
        self.icons.push((id.to_string(), None));
        self
    }

    pub fn with_named_icon(mut self, id: &str, name: &str) -> Self {
        self.icons.push((id.to_string(), Some(name.to_string())));
        self
    }

    pub fn with_category(mut self, title: &str, ids: &[&str]) -> Self {
        self.categories.push((
            title.to_string(),
            ids.iter().map(|id| id.to_string()).collect(),
        ));
        self
    }

    /// Write the pack below `root` and return `root`
    pub fn build(self, root: &Path) -> Result<PathBuf> {
        let xml_dir = root.join("app/src/main/res/xml");
        let image_dir = root.join("app/src/main/res/drawable-nodpi");
        fs::create_dir_all(&xml_dir)?;
        fs::create_dir_all(&image_dir)?;

        fs::write(xml_dir.join("appfilter.xml"), appfilter_xml(&self.icons))?;
        for (id, _) in &self.icons {
            fs::write(image_dir.join(format!("{id}.png")), id.as_bytes())?;
        }

        if !self.categories.is_empty() {
            let mut drawable = String::from("<resources>\n    <version>1</version>\n");
            for (title, ids) in &self.categories {
                drawable.push_str(&format!("    <category title=\"{title}\" />\n"));
                for id in ids {
                    drawable.push_str(&format!("    <item drawable=\"{id}\" />\n"));
                }
            }
            drawable.push_str("</resources>\n");
            fs::write(xml_dir.join("drawable.xml"), drawable)?;
        }

        Ok(root.to_path_buf())
    }
}

/// Render an `appfilter.xml` listing one component per icon
pub fn appfilter_xml(icons: &[(String, Option<String>)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n");
    for (id, name) in icons {
        let component = format!("ComponentInfo{{com.example.{id}/com.example.{id}.MainActivity}}");
        match name {
            Some(name) => xml.push_str(&format!(
                "    <item component=\"{component}\" drawable=\"{id}\" name=\"{name}\" />\n"
            )),
            None => xml.push_str(&format!(
                "    <!-- {id} app -->\n    <item component=\"{component}\" drawable=\"{id}\" />\n"
            )),
        }
    }
    xml.push_str("</resources>\n");
    xml
}

/// Write a request archive the way icon request tools bundle them
pub fn write_request_zip(path: &Path, ids: &[&str], with_images: bool) -> Result<()> {
    let icons: Vec<(String, Option<String>)> =
        ids.iter().map(|id| (id.to_string(), None)).collect();
    let mut writer = ZipWriter::new(fs::File::create(path)?);

    writer.start_file("IconRequest/appfilter.xml", SimpleFileOptions::default())?;
    writer.write_all(appfilter_xml(&icons).as_bytes())?;
    if with_images {
        for id in ids {
            writer.start_file(format!("IconRequest/{id}.png"), SimpleFileOptions::default())?;
            writer.write_all(format!("request {id}").as_bytes())?;
        }
    }
    writer.finish()?;
    Ok(())
}

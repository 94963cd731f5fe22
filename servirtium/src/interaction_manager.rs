use crate::{data::InteractionData, markdown};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

pub trait InteractionManager: Debug {
    fn load_interactions(
        &self,
    ) -> Result<Vec<InteractionData>, Box<dyn std::error::Error + Send + Sync>>;
    fn save_interactions(
        &self,
        interactions: &[InteractionData],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Fails with a description of the first difference when `interactions` don't match what
    /// was stored before. Nothing stored yet counts as unchanged.
    fn check_data_unchanged(
        &self,
        interactions: &[InteractionData],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone)]
pub struct MarkdownInteractionManager {
    markdown_path: PathBuf,
}

impl MarkdownInteractionManager {
    pub fn new<P: Into<PathBuf>>(markdown_path: P) -> Self {
        Self {
            markdown_path: markdown_path.into(),
        }
    }

    pub fn markdown_path(&self) -> &Path {
        &self.markdown_path
    }
}

impl InteractionManager for MarkdownInteractionManager {
    fn load_interactions(
        &self,
    ) -> Result<Vec<InteractionData>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(markdown::load_markdown(&self.markdown_path)?)
    }

    fn save_interactions(
        &self,
        interactions: &[InteractionData],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = self.markdown_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(markdown::save_interactions(&self.markdown_path, interactions)?)
    }

    fn check_data_unchanged(
        &self,
        interactions: &[InteractionData],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.markdown_path.exists() {
            return Ok(());
        }

        Ok(markdown::check_markdown_data_unchanged(
            &self.markdown_path,
            interactions,
        )?)
    }
}

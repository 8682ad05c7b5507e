//! Configuration generator module
//!
//! This module drives one generation run: load the link list (remote or
//! local), decode it if needed, run the pipeline and write the YAML
//! document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::StashConfig;
use crate::parser::{ListType, decode_base64_text, detect_list_type};
use crate::pipeline::{Pipeline, PipelineOutput};

// Sub-modules
pub mod generator_config;
pub mod helpers;

// Re-exports
pub use generator_config::GeneratorConfig;
pub use helpers::{FetchError, expand_tilde, fetch_text, load_text};

// ============================================================================
// Generator
// ============================================================================

/// Generator that orchestrates the config generation process
pub struct Generator {
    config: GeneratorConfig,
    pipeline: Pipeline,
}

impl Generator {
    /// Create a new generator with the given config
    pub fn new(config: GeneratorConfig) -> Self {
        let pipeline = Pipeline::new(config.parse_policy(), config.synthesizer_options());
        Self { config, pipeline }
    }

    /// Retrieve the link list, decoding Base64 lists.
    pub async fn fetch_source(&self) -> Result<String, FetchError> {
        let source = &self.config.source;
        info!("Downloading link list from {}", source);

        let timeout = self.config.fetch_timeout();
        let content = load_text(source, &self.config.user_agent, timeout).await?;
        debug!("Received {} bytes of content", content.len());

        decode_source(source, &content)
    }

    /// Run the generation process
    pub async fn generate(&self) -> Result<PipelineOutput> {
        info!("Starting config generation");

        let text = self
            .fetch_source()
            .await
            .context("Failed to retrieve link list")?;

        self.generate_from_text(&text)
    }

    /// Run the pipeline over already retrieved text.
    pub fn generate_from_text(&self, text: &str) -> Result<PipelineOutput> {
        info!("Total lines: {}", text.lines().count());
        let output = self
            .pipeline
            .run(text)
            .context("Generated config failed integrity check")?;

        let stats = &output.stats;
        if stats.total_rejected() > 0 {
            info!("Skipped (invalid): {}", stats.total_rejected());
            for (reason, count) in &stats.rejected {
                debug!("  {}: {}", reason, count);
            }
        }

        Ok(output)
    }

    /// Generate and write to output file.
    ///
    /// Returns the written path, or `None` when no valid proxy was found
    /// and nothing was written.
    pub async fn generate_to_file(
        &self,
        output_override: Option<&str>,
    ) -> Result<Option<PathBuf>> {
        let output = self.generate().await?;

        if output.is_empty() {
            warn!("No valid servers found, config not written");
            return Ok(None);
        }

        let output_path = output_override.unwrap_or(&self.config.output);
        let path = PathBuf::from(expand_tilde(output_path));
        write_config(&output.document, &path).await?;

        info!(
            "Config written to {:?} | Proxies: {}",
            path,
            output.document.proxies.len()
        );
        Ok(Some(path))
    }
}

/// Decodes `content` if it is a Base64-wrapped link list.
fn decode_source(source: &str, content: &str) -> Result<String, FetchError> {
    let list_type = detect_list_type(content);
    debug!("Detected list type: {}", list_type);

    match list_type {
        ListType::Base64LinkList => {
            decode_base64_text(content).map_err(|e| FetchError::Decode {
                source_name: source.to_string(),
                reason: format!("{:#}", e),
            })
        }
        ListType::Unknown => {
            warn!("Unrecognized list format from {}, parsing as plain text", source);
            Ok(content.to_string())
        }
        ListType::PlainLinkList => Ok(content.to_string()),
    }
}

/// Serialize `config` to YAML and write it, creating parent directories.
pub async fn write_config(config: &StashConfig, path: &Path) -> Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let yaml = config
        .to_yaml()
        .context("Failed to serialize config to YAML")?;

    tokio::fs::write(path, &yaml)
        .await
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    let size_kb = yaml.len() as f64 / 1024.0;
    debug!("Wrote {:.1} KB", size_kb);
    Ok(())
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use crate::synthesizer::templates::MAIN_GROUP;

    const UUID: &str = "b831381d-6324-4d53-ad4f-8cda48b30811";

    fn link(host: &str, name: &str) -> String {
        format!("vless://{UUID}@{host}:443?security=reality&pbk=KEY&sni=example.com&fp=chrome#{name}")
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stashgen-{}-{}", std::process::id(), name))
    }

    fn generator_for(source: &Path, output: &Path) -> Generator {
        Generator::new(GeneratorConfig {
            source: source.to_string_lossy().into_owned(),
            output: output.to_string_lossy().into_owned(),
            ..Default::default()
        })
    }

    #[test]
    fn test_decode_source_plain() {
        let text = format!("{}\n", link("1.1.1.1", "A"));
        assert_eq!(decode_source("src", &text).unwrap(), text);
    }

    #[test]
    fn test_decode_source_base64() {
        let text = format!("{}\n{}\n", link("1.1.1.1", "A"), link("2.2.2.2", "B"));
        let encoded = STANDARD.encode(&text);
        assert_eq!(decode_source("src", &encoded).unwrap(), text);
    }

    #[test]
    fn test_decode_source_unknown_passes_through() {
        let text = "<html>not a list</html>";
        assert_eq!(decode_source("src", text).unwrap(), text);
    }

    #[test]
    fn test_generate_from_text() {
        let generator = Generator::new(GeneratorConfig::default());
        let text = format!("{}\n{}\n", link("1.1.1.1", "A"), link("1.1.1.1", "B"));
        let output = generator.generate_from_text(&text).unwrap();
        assert_eq!(output.stats.duplicates, 1);
        assert_eq!(output.document.proxy_names(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_generate_to_file_writes_yaml() {
        let source = temp_path("source.txt");
        let output = temp_path("out").join("stash.yaml");
        let text = format!(
            "{}\n{}\n",
            link("1.1.1.1", "Node%20A"),
            link("2.2.2.2", "Node%20B")
        );
        tokio::fs::write(&source, &text).await.unwrap();

        let generator = generator_for(&source, &output);
        let written = generator.generate_to_file(None).await.unwrap();
        assert_eq!(written.as_deref(), Some(output.as_path()));

        let yaml = tokio::fs::read_to_string(&output).await.unwrap();
        assert!(yaml.starts_with("mode: rule\n"));
        let document = StashConfig::from_yaml(&yaml).unwrap();
        assert_eq!(document.proxy_names(), vec!["Node A", "Node B"]);
        assert!(document.group(MAIN_GROUP).is_some());
        assert!(document.validate().is_ok());

        let _ = tokio::fs::remove_file(&source).await;
        let _ = tokio::fs::remove_dir_all(output.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_generate_to_file_skips_empty_result() {
        let source = temp_path("empty-source.txt");
        let output = temp_path("empty-out.yaml");
        tokio::fs::write(&source, "# nothing here\nvless://broken\n")
            .await
            .unwrap();

        let generator = generator_for(&source, &output);
        let written = generator.generate_to_file(None).await.unwrap();
        assert!(written.is_none());
        assert!(!output.exists());

        let _ = tokio::fs::remove_file(&source).await;
    }

    #[tokio::test]
    async fn test_missing_source_is_fetch_error() {
        let generator = generator_for(
            Path::new("/nonexistent/stashgen/source.txt"),
            &temp_path("never.yaml"),
        );
        let err = generator.generate_to_file(None).await.unwrap_err();
        assert!(err.downcast_ref::<FetchError>().is_some());
    }
}

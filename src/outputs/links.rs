//! External links for catalogued files.
//!
//! Pure string building from `[github]` config; no I/O.

use super::OutputType;
use crate::config::GithubConfig;

const GITHUB: &str = "https://github.com";
const COLAB_GITHUB: &str = "https://colab.research.google.com/github";

/// Builds source-repository and Colab links for output files.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    /// `{user}/{repo}/blob/{branch}/{outputs_path}`, shared by both link kinds.
    blob_root: String,
}

impl LinkBuilder {
    pub fn new(github: &GithubConfig) -> Self {
        let outputs_path = github.outputs_path.trim_matches('/');
        Self {
            blob_root: format!(
                "{}/{}/blob/{}/{}",
                github.user, github.repo, github.branch, outputs_path
            ),
        }
    }

    /// Source view of `{output}/{category}/{filename}` on GitHub.
    pub fn github_url(&self, output: OutputType, category: &str, filename: &str) -> String {
        format!(
            "{GITHUB}/{}/{}/{category}/{filename}",
            self.blob_root,
            output.slug()
        )
    }

    /// Opens a notebook from the `colab` output directory in Colab.
    pub fn colab_url(&self, category: &str, filename: &str) -> String {
        format!(
            "{COLAB_GITHUB}/{}/{}/{category}/{filename}",
            self.blob_root,
            OutputType::Colab.slug()
        )
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(&GithubConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> GithubConfig {
        GithubConfig {
            user: "AhmedMashour".into(),
            repo: "mathhook-kb".into(),
            branch: "master".into(),
            outputs_path: "mathhook-docs-site/public/outputs".into(),
        }
    }

    #[test]
    fn test_github_url() {
        let links = LinkBuilder::new(&github());
        assert_eq!(
            links.github_url(OutputType::Latex, "algebra", "simplify.tex"),
            "https://github.com/AhmedMashour/mathhook-kb/blob/master/mathhook-docs-site/public/outputs/latex/algebra/simplify.tex"
        );
    }

    #[test]
    fn test_colab_url() {
        let links = LinkBuilder::new(&github());
        assert_eq!(
            links.colab_url("calculus", "deriv.ipynb"),
            "https://colab.research.google.com/github/AhmedMashour/mathhook-kb/blob/master/mathhook-docs-site/public/outputs/colab/calculus/deriv.ipynb"
        );
    }

    #[test]
    fn test_outputs_path_slashes_trimmed() {
        let mut config = github();
        config.outputs_path = "/outputs/".into();
        let links = LinkBuilder::new(&config);
        assert_eq!(
            links.github_url(OutputType::Vue, "ode", "a.vue"),
            "https://github.com/AhmedMashour/mathhook-kb/blob/master/outputs/vue/ode/a.vue"
        );
    }
}

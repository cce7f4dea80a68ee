//! Prompt builder.
//!
//! Builds the two chat messages sent to the completion service. The layout
//! of the user message is fixed: input directory, TMDB blocks, file list,
//! then hints. Answer quality depends on that placement, so it is covered
//! by exact-output tests.

use crate::core::scanner::FileList;
use crate::models::metadata::SeriesMetadata;
use crate::models::plan::IndexedFile;
use crate::Result;

/// Renaming rules given to the model.
pub const SYSTEM_PROMPT: &str = "You are an assistant, and your goal is to help users rename file names according to the following rules. The user will provide an input directory and a list of files in JSONL format. You will output the new location for each file after renaming based on the file list.
You will rename files based on the information extracted from the input directory and the file list. Prioritize using the information specified by the user. If no specific information is provided by the user, use the information extracted from the inputs mentioned above.  If user provide TMDB data, use the information from TMDB data first.
The format for the highest-level directory is `Series Name (Year)`, which may optionally include a TMDB ID or TVDB ID, for example, `Series Name (Year) [tmdbid-1234]`.
The second-level directory format is `Season XX`. If there is not enough information, use `Season 01` by default. Special episodes, such as OVA, can use `Season 00`. Other movies, such as Bonus, should use `extras`. Trailers for episodes should be same as the episode.
The format for files in the third level is `SXXEXX Episode Name`. If multiple episodes are merged, use the following format: `SXXEXX-EXX Episode Name1/Episode Name2`. The episode name is optional. `SXXEXX` must be empty if file is in `extras` folder. If video is a trailer, add `.trailer` to name. For trailers, it is not necessary to replace the episode number with a small one.
The output file names must be relative path.
The output file names must retain parts of subtitle files, such as `.sc`, that indicate the language.";

/// Appended to the system prompt for models without structured output.
pub const FORMAT_INSTRUCTION: &str =
    "\nThe format of the returned result is consistent with the input file list.";

/// Optional user-supplied facts about the series.
#[derive(Debug, Clone, Default)]
pub struct PromptHints {
    pub series_name: Option<String>,
    pub year: Option<u32>,
    pub tmdb_id: Option<u64>,
    pub tvdb_id: Option<u64>,
}

/// The system instruction and user message for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the prompt for a file list.
    pub fn build(
        input_dir: &str,
        files: &FileList,
        metadata: Option<&SeriesMetadata>,
        hints: &PromptHints,
    ) -> Result<Self> {
        Ok(Self {
            system: SYSTEM_PROMPT.to_string(),
            user: build_user_message(input_dir, files, metadata, hints)?,
        })
    }

    /// System instruction with the free-text format rule appended.
    pub fn system_with_format_instruction(&self) -> String {
        format!("{}{}", self.system, FORMAT_INSTRUCTION)
    }
}

/// Render the file list as a fenced JSONL block.
pub fn file_list_block(files: &FileList) -> Result<String> {
    let mut block = String::from("Here are file list:\n```jsonl");
    for (index, name) in files.iter().enumerate() {
        block.push('\n');
        block.push_str(&serde_json::to_string(&IndexedFile::new(index, name))?);
    }
    block.push_str("\n```");
    Ok(block)
}

/// Render series and season info as fenced JSON blocks.
pub fn metadata_block(metadata: &SeriesMetadata) -> Result<String> {
    let mut block = String::from("Here are series info from TMDB:\n```json\n");
    block.push_str(&serde_json::to_string(&metadata.series_info)?);
    block.push_str("\n```");

    for season in &metadata.seasons {
        block.push_str(&format!(
            "\nHere are season {} info from TMDB:\n```json\n",
            season.season_number
        ));
        block.push_str(&serde_json::to_string(&season.info)?);
        block.push_str("\n```");
    }
    Ok(block)
}

/// Assemble the user message.
pub fn build_user_message(
    input_dir: &str,
    files: &FileList,
    metadata: Option<&SeriesMetadata>,
    hints: &PromptHints,
) -> Result<String> {
    let mut prompt = format!("The input directory is `{}`.", input_dir);

    if let Some(metadata) = metadata {
        prompt.push('\n');
        prompt.push_str(&metadata_block(metadata)?);
    }

    prompt.push('\n');
    prompt.push_str(&file_list_block(files)?);

    if let Some(name) = &hints.series_name {
        prompt.push_str(&format!("\nThe series name is `{}`.", name));
    }
    if let Some(year) = hints.year {
        prompt.push_str(&format!("\nThe year of series is `{}`.", year));
    }
    if let Some(id) = hints.tmdb_id {
        prompt.push_str(&format!("\nThe TMDB ID is `{}`.", id));
    }
    if let Some(id) = hints.tvdb_id {
        prompt.push_str(&format!("\nThe TVDB ID is `{}`.", id));
    }

    Ok(prompt)
}

//! Option table
//!
//! Every option the launcher knows, in the order its tokens are emitted.
//! The same table drives the form layout.

/// How an option is rendered on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free text value (paths, names, templates)
    Text,
    /// Integer value
    Integer,
    /// Floating point value
    Float,
    /// Boolean switch, flag token only
    Flag,
    /// Free-form extra arguments split with shell rules
    Raw,
}

/// Form section an option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionGroup {
    Model,
    Network,
    Performance,
    Sampling,
    Api,
    Flags,
    Custom,
}

impl OptionGroup {
    pub const ALL: [OptionGroup; 7] = [
        OptionGroup::Model,
        OptionGroup::Network,
        OptionGroup::Performance,
        OptionGroup::Sampling,
        OptionGroup::Api,
        OptionGroup::Flags,
        OptionGroup::Custom,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            OptionGroup::Model => "Model",
            OptionGroup::Network => "Network Settings",
            OptionGroup::Performance => "Performance Settings",
            OptionGroup::Sampling => "Sampling Settings",
            OptionGroup::Api => "API, Multimodal & Batch Settings",
            OptionGroup::Flags => "Flags",
            OptionGroup::Custom => "Custom Arguments",
        }
    }
}

/// Static description of one launch option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Key in `LaunchConfig` and in the settings file
    pub key: &'static str,
    /// Command-line flag, empty for `Raw`
    pub flag: &'static str,
    pub kind: OptionKind,
    pub group: OptionGroup,
    pub label: &'static str,
    pub hint: &'static str,
}

const fn spec(
    key: &'static str,
    flag: &'static str,
    kind: OptionKind,
    group: OptionGroup,
    label: &'static str,
    hint: &'static str,
) -> OptionSpec {
    OptionSpec {
        key,
        flag,
        kind,
        group,
        label,
        hint,
    }
}

use OptionGroup as G;
use OptionKind as K;

/// Emission order: model, network, performance, sampling, API/multimodal/batch,
/// boolean flags, then custom arguments.
pub const OPTIONS: &[OptionSpec] = &[
    spec("model", "-m", K::Text, G::Model, "Model (-m)", "Path to the GGUF file"),
    spec("host", "--host", K::Text, G::Network, "Host (--host)", "IP address to bind (0.0.0.0 for all)"),
    spec("port", "--port", K::Integer, G::Network, "Port (--port)", "Port number (default: 8033)"),
    spec("ngl", "-ngl", K::Integer, G::Performance, "GPU Layers (-ngl)", "Number of layers to offload to GPU (99 = all)"),
    spec("ncmoe", "-ncmoe", K::Integer, G::Performance, "MoE CPU Layers (-ncmoe)", "Keep MoE experts of the first N layers on CPU (empty = default)"),
    spec("threads", "--threads", K::Integer, G::Performance, "Threads (--threads)", "Number of threads (-1 = auto)"),
    spec("ctx_size", "--ctx-size", K::Integer, G::Performance, "Context Size (--ctx-size)", "Context window size in tokens"),
    spec("temp", "--temp", K::Float, G::Sampling, "Temperature (--temp)", "Sampling temperature (0.0-2.0)"),
    spec("min_p", "--min-p", K::Float, G::Sampling, "Min P (--min-p)", "Minimum probability threshold (0.0-1.0)"),
    spec("top_p", "--top-p", K::Float, G::Sampling, "Top P (--top-p)", "Top-p sampling probability (0.0-1.0)"),
    spec("top_k", "--top-k", K::Integer, G::Sampling, "Top K (--top-k)", "Top-k filtering (0 = disabled)"),
    spec("presence_penalty", "--presence-penalty", K::Float, G::Sampling, "Presence Penalty", "Presence penalty (-2.0 to 2.0)"),
    spec("repeat_penalty", "--repeat-penalty", K::Float, G::Sampling, "Repeat Penalty", "Repeat penalty (1.0 = disabled)"),
    spec("frequency_penalty", "--frequency-penalty", K::Float, G::Sampling, "Frequency Penalty", "Frequency penalty (0.0-2.0)"),
    spec("mmproj", "--mmproj", K::Text, G::Api, "MMProj Path (--mmproj)", "Multimodal projector file"),
    spec("api_key", "--api-key", K::Text, G::Api, "API Key (--api-key)", "API key for authentication (optional)"),
    spec("model_alias", "--alias", K::Text, G::Api, "Model Alias (--alias)", "Model name returned by /v1/models"),
    spec("chat_template", "--chat-template", K::Text, G::Api, "Chat Template", "Built-in template name or Jinja2 template"),
    spec("chat_template_file", "--chat-template-file", K::Text, G::Api, "Chat Template File", "Path to a Jinja2 template file"),
    spec("batch_size", "-b", K::Integer, G::Api, "Batch Size (-b)", "Logical batch size (empty = default)"),
    spec("ubatch_size", "-ub", K::Integer, G::Api, "Micro Batch (-ub)", "Physical batch size (empty = default)"),
    spec("parallel", "--parallel", K::Integer, G::Api, "Parallel Slots (--parallel)", "Number of parallel sequences"),
    spec("n_predict", "-n", K::Integer, G::Api, "Max Predict (-n)", "Max tokens to predict (-1 = infinite)"),
    spec("rope_freq_base", "--rope-freq-base", K::Float, G::Api, "RoPE Freq Base", "RoPE frequency base (empty = default)"),
    spec("rope_freq_scale", "--rope-freq-scale", K::Float, G::Api, "RoPE Freq Scale", "RoPE frequency scale (empty = default)"),
    spec("jinja", "--jinja", K::Flag, G::Flags, "Enable Jinja templates (--jinja)", ""),
    spec("flash_attn", "-fa", K::Flag, G::Flags, "Flash Attention (-fa)", ""),
    spec("mlock", "--mlock", K::Flag, G::Flags, "Lock memory (--mlock)", ""),
    spec("no_mmap", "--no-mmap", K::Flag, G::Flags, "Disable mmap (--no-mmap)", ""),
    spec("cont_batching", "-cb", K::Flag, G::Flags, "Continuous batching (-cb)", ""),
    spec("metrics", "--metrics", K::Flag, G::Flags, "Enable metrics (--metrics)", ""),
    spec("verbose", "--verbose", K::Flag, G::Flags, "Verbose output (--verbose)", ""),
    spec("log_disable", "--log-disable", K::Flag, G::Flags, "Disable logging (--log-disable)", ""),
    spec("custom_args", "", K::Raw, G::Custom, "Additional arguments", "Appended as-is, shell quoting rules apply"),
];

/// Find the spec for an option key
pub fn lookup(key: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| spec.key == key)
}

/// Options in one form group, in emission order
pub fn in_group(group: OptionGroup) -> impl Iterator<Item = &'static OptionSpec> {
    OPTIONS.iter().filter(move |spec| spec.group == group)
}

/*!
This library decodes the output of a sequence labeling model back into a biomedical event
graph, written as BioNLP shared task `.a2` annotations. The tagger sees one label per word, so
the graph has to be flattened before training: every mention points at the event it is an
argument of with a relative position. Decoding inverts this flattening.

# Label format
A label is made of fields separated by `|`:
* `O`: the token is outside of any mention.
* `B-Protein` or `B-Protein|O`: the token is a mention without outgoing argument.
* `B-Protein|Theme|Gene_expression|+1`: the token is a mention and the `Theme` of the first
    `Gene_expression` trigger to its right. `-2` would be the second one to its left.

A token can be the argument of several events. Its heads are then joined by `$`. A trigger with
several types joins them with `////`. In the `struct` encoding the structure and the types are
two tasks joined by `{}`, such as `B-E|+1{}B-Protein|Theme`.

# Pipeline
Each document is decoded sentence by sentence:
* Mentions are built, contiguous tokens of a trigger are merged and each trigger gets an event.
* Every argument is attached to its source event.
* Events with several Themes or Causes are split into binary events. Binding events are split
    according to the `BindingStrategy`.
* Events pointing at a split event are expanded, until no reference to a split event is left.
* Events without Theme are dropped, and so are the events pointing at a missing event.
* Overlapping triggers, such as a regulation and an expression on the same word, are bridged.

# Terminology
* A mention is a span of text typed as an entity (`Protein`, `Entity`) or as a trigger.
* A trigger is a mention anchoring an event.
* An event links its trigger to its arguments, entities or other events, through roles such as
    `Theme` or `Cause`.
* The hop count of an argument is the number of matching triggers to skip to find its source.
*/

mod config;
mod decode;
mod document;
mod error;
mod graph;
mod label;
mod output;

// The public api starts here
pub use config::{
    parse_toggle, BindingStrategy, ConfigError, DecoderConfig, DecoderConfigBuilder, Encoding,
};

pub use decode::{decode_document, decode_documents, DecodeStats, DecodedDocument};

pub use document::{parse_documents, read_documents, Document, Sentence, Span, Token};

pub use error::DecodeError;

pub use graph::{
    canonical_kind, ArgTarget, ArgumentEdge, EntityMention, Event, EventId, TriggerId,
    TriggerMention,
};

pub use label::{Direction, LabelError, LabelUnit, Pointer, TokenLabel};

pub use output::write_a2_files;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Main entrypoint of the library. Decodes every document of a tagged text.
///
/// * `input`: Output of the tagger, with `# doc_id = ` lines between documents.
/// * `config`: Options of the decoder.
///
/// #Example
/// ```rust
/// use biodecode::{decode_str, DecoderConfig};
/// let input = "# doc_id = PMID-1
/// IL-2\t0-4\tT1\tB-Protein|Theme|Gene_expression|+1
/// expression\t5-15\tO\tB-Gene_expression|O
/// ";
/// let documents = decode_str(input, &DecoderConfig::default());
/// assert_eq!(
///     documents[0].to_a2(),
///     "T1001\tGene_expression 5 15\texpression\nE1\tGene_expression:T1001 Theme:T1\n"
/// );
/// ```
pub fn decode_str(input: &str, config: &DecoderConfig) -> Vec<DecodedDocument> {
    let documents = parse_documents(input, config.encoding());
    decode_documents(&documents, config)
}

/// Same as `decode_str`, reading the tagged text from `path`. Only failing to read the file is
/// an error.
pub fn decode_file<P: AsRef<Path>>(
    path: P,
    config: &DecoderConfig,
) -> Result<Vec<DecodedDocument>, DecodeError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(DecodeError::read(path))?;
    let documents = read_documents(BufReader::new(file), config.encoding()).map_err(|e| match e {
        DecodeError::Io(source) => DecodeError::read(path)(source),
        other => other,
    })?;
    Ok(decode_documents(&documents, config))
}

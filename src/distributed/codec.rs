//! Length-prefixed word stream for shipping repaired routes between ranks.
//!
//! Each route is written as `stop_count`, the stops, then `total_cost`.
//! Routes differ in length after repair, so the prefix is what lets the
//! coordinator split the gathered buffer again.

use super::comm::Word;
use crate::error::{Error, Result};
use crate::route::RepairedRoute;

/// Number of words `routes` occupy once encoded.
pub fn encoded_len(routes: &[RepairedRoute]) -> usize {
    routes.iter().map(|route| route.stops.len() + 2).sum()
}

/// Serialize routes into one flat stream.
pub fn encode_routes(routes: &[RepairedRoute]) -> Result<Vec<Word>> {
    let mut stream = Vec::with_capacity(encoded_len(routes));

    for route in routes {
        stream.push(to_word(route.stops.len(), "stop count")?);
        for &stop in &route.stops {
            stream.push(to_word(stop, "stop")?);
        }
        stream.push(
            Word::try_from(route.total_cost)
                .map_err(|_| Error::invalid_data(format!("cost {} overflows a word", route.total_cost)))?,
        );
    }

    Ok(stream)
}

/// Inverse of [`encode_routes`].
pub fn decode_routes(stream: &[Word]) -> Result<Vec<RepairedRoute>> {
    let mut routes = Vec::new();
    let mut cursor = 0;

    while cursor < stream.len() {
        let count = from_word::<usize>(stream[cursor], cursor, "stop count")?;
        let start = cursor + 1;
        let end = start + count;
        if end >= stream.len() {
            return Err(Error::invalid_data(format!(
                "route at word {cursor} announces {count} stops but the stream ends at {}",
                stream.len()
            )));
        }

        let stops = stream[start..end]
            .iter()
            .enumerate()
            .map(|(offset, &word)| from_word(word, start + offset, "stop"))
            .collect::<Result<Vec<_>>>()?;
        let total_cost = from_word::<u64>(stream[end], end, "cost")?;

        routes.push(RepairedRoute::new(stops, total_cost));
        cursor = end + 1;
    }

    Ok(routes)
}

fn to_word(value: usize, what: &str) -> Result<Word> {
    Word::try_from(value).map_err(|_| Error::invalid_data(format!("{what} {value} overflows a word")))
}

fn from_word<T: TryFrom<Word>>(word: Word, position: usize, what: &str) -> Result<T> {
    T::try_from(word)
        .map_err(|_| Error::invalid_data(format!("{what} at word {position} is invalid: {word}")))
}

use std::borrow::Cow;

use serde::{de::Error as _, Deserialize, Serialize};

use crate::alphabet::Alphabet;

use super::{build_positions, table_length, FitnessModel};

#[derive(Serialize, Deserialize)]
struct SerialisedFitnessModel<'a> {
    alphabet: String,
    floor: f64,
    normal: f64,
    table: Cow<'a, [f64]>,
}

impl Serialize for FitnessModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SerialisedFitnessModel {
            alphabet: self.alphabet.to_string(),
            floor: self.floor,
            normal: self.normal,
            table: Cow::Borrowed(&self.table),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FitnessModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serialised = SerialisedFitnessModel::deserialize(deserializer)?;
        let alphabet: Alphabet = serialised.alphabet.parse().map_err(D::Error::custom)?;
        if alphabet.len() != serialised.alphabet.chars().count() {
            return Err(D::Error::custom("alphabet contains duplicate characters"));
        }

        let (position_of, char_of) = build_positions(&alphabet).map_err(D::Error::custom)?;
        let expected_length = table_length(char_of.len()).map_err(D::Error::custom)?;
        if serialised.table.len() != expected_length {
            return Err(D::Error::custom(format!(
                "table has {} cells, but an alphabet of size {} requires {expected_length}",
                serialised.table.len(),
                char_of.len(),
            )));
        }
        if !(serialised.normal.is_finite() && serialised.normal > 0.0) {
            return Err(D::Error::custom("normal must be finite and positive"));
        }

        Ok(Self {
            alphabet,
            position_of,
            char_of,
            table: serialised.table.into_owned(),
            floor: serialised.floor,
            normal: serialised.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        alphabet::Alphabet, dataset::QuadgramDataset, error::Error, model::FitnessModel,
    };

    fn small_model() -> FitnessModel {
        let alphabet: Alphabet = "abcäß".parse().unwrap();
        let mut dataset = QuadgramDataset::new(alphabet);
        dataset.add("ABCÄ", 7).unwrap();
        dataset.add("ßßAB", 3).unwrap();
        dataset.add("CCCC", 1).unwrap();
        FitnessModel::new(&dataset).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_scores() {
        let model = small_model();
        let mut bytes = Vec::new();
        model.save(&mut bytes).unwrap();
        let loaded = FitnessModel::load(bytes.as_slice()).unwrap();

        assert_eq!(loaded.alphabet(), model.alphabet());
        assert_eq!(loaded.floor(), model.floor());
        assert_eq!(loaded.normal(), model.normal());
        assert_eq!(loaded.table, model.table);
        for text in ["abcäßßab", "cccccab", "ßßabcä"] {
            assert_eq!(
                loaded.get_fitness(text).unwrap(),
                model.get_fitness(text).unwrap()
            );
        }
    }

    #[test]
    fn test_rejects_wrong_table_length() {
        let model = small_model();
        let mut value = ciborium::Value::serialized(&model).unwrap();
        if let ciborium::Value::Map(entries) = &mut value {
            for (key, entry) in entries.iter_mut() {
                if key.as_text() == Some("table") {
                    if let ciborium::Value::Array(cells) = entry {
                        cells.pop();
                    }
                }
            }
        }

        let mut bytes = Vec::new();
        ciborium::into_writer(&value, &mut bytes).unwrap();
        assert!(matches!(
            FitnessModel::load(bytes.as_slice()),
            Err(Error::ModelDeserialisation(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            FitnessModel::load(&[0xffu8, 0x00, 0x13][..]),
            Err(Error::ModelDeserialisation(_))
        ));
    }
}

//! Scene of spatial objects with cached relations.
//!
//! The scene owns the objects in an arena and hands out indices. Each
//! object's relations, with every other object as subject, are computed on
//! first request and cached until the scene changes.
//!
//! - Object arena with index and id lookups
//! - Shared adjustment, deduced categories and north direction
//! - Textual `adjust` and `deduce` commands
//! - Parallel evaluation of all pairs with rayon
//! - JSON import and export of the object list
//!
//! # Key Invariants
//!
//! Every mutation through the scene (objects, adjustment, categories,
//! north) clears the cache, so cached relations always match the current
//! state.

use std::collections::HashMap;

use nalgebra::Vector2;
use rayon::prelude::*;
use serde_json::Value;

use crate::basics::{Adjustment, NearbySchema, PredicateCategories, SectorSchema};
use crate::context::Context;
use crate::error::{Result, SpatialError};
use crate::object::SpatialObject;
use crate::predicate::SpatialPredicate;
use crate::relation::SpatialRelation;


/// Object arena with shared reasoning settings and a relation cache.
#[derive(Debug, Clone)]
pub struct Scene {
    adjustment: Adjustment,
    deduce: PredicateCategories,
    north: Option<Vector2<f64>>,
    objects: Vec<SpatialObject>,
    observer: Option<usize>,
    cache: HashMap<usize, Vec<SpatialRelation>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            adjustment: Adjustment::default(),
            deduce: PredicateCategories::default(),
            north: Some(Vector2::new(0.0, -1.0)),
            objects: Vec::new(),
            observer: None,
            cache: HashMap::new(),
        }
    }

    pub fn with_settings(
        adjustment: Adjustment,
        deduce: PredicateCategories,
        north: Option<Vector2<f64>>,
    ) -> Result<Self> {
        adjustment.validate()?;
        Ok(Self {
            adjustment,
            deduce,
            north,
            ..Self::new()
        })
    }

    /// Replace all objects. Indices follow the order of `objects` and the
    /// first self tracked object becomes the observer.
    pub fn load(&mut self, objects: Vec<SpatialObject>) {
        self.objects = objects;
        for (i, obj) in self.objects.iter_mut().enumerate() {
            obj.index = Some(i);
        }
        self.observer = self.objects.iter().position(SpatialObject::observing);
        log::debug!(
            "loaded {} objects, observer {:?}",
            self.objects.len(),
            self.observer
        );
        self.invalidate();
    }

    /// Load a JSON array of object dictionaries.
    pub fn load_from_json(&mut self, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| SpatialError::InvalidScene("expected an array of objects".into()))?;
        let objects = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object()
                    .map(SpatialObject::from_dict)
                    .ok_or_else(|| SpatialError::InvalidScene(format!("item {} is not an object", i)))
            })
            .collect::<Result<Vec<_>>>()?;
        self.load(objects);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let items: Vec<Value> = self
            .objects
            .iter()
            .map(|obj| Value::Object(obj.to_any()))
            .collect();
        Ok(serde_json::to_string_pretty(&items)?)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SpatialObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Result<&SpatialObject> {
        self.objects.get(index).ok_or(SpatialError::IndexOutOfRange {
            index,
            len: self.objects.len(),
        })
    }

    /// Mutable access to an object. Clears the relation cache.
    pub fn object_mut(&mut self, index: usize) -> Result<&mut SpatialObject> {
        let len = self.objects.len();
        self.invalidate();
        self.objects
            .get_mut(index)
            .ok_or(SpatialError::IndexOutOfRange { index, len })
    }

    pub fn object_with_id(&self, id: &str) -> Option<&SpatialObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|obj| obj.id == id)
    }

    pub fn observer(&self) -> Option<&SpatialObject> {
        self.observer.and_then(|i| self.objects.get(i))
    }

    pub fn adjustment(&self) -> &Adjustment {
        &self.adjustment
    }

    pub fn set_adjustment(&mut self, adjustment: Adjustment) -> Result<()> {
        adjustment.validate()?;
        self.adjustment = adjustment;
        self.invalidate();
        Ok(())
    }

    pub fn deduce(&self) -> &PredicateCategories {
        &self.deduce
    }

    pub fn set_deduce(&mut self, deduce: PredicateCategories) {
        self.deduce = deduce;
        self.invalidate();
    }

    pub fn north(&self) -> Option<Vector2<f64>> {
        self.north
    }

    pub fn set_north(&mut self, north: Option<Vector2<f64>>) {
        self.north = north;
        self.invalidate();
    }

    /// Snapshot of the reasoning settings for relation calls.
    pub fn context(&self) -> Context<'_> {
        Context {
            adjustment: self.adjustment,
            deduce: self.deduce,
            observer: self.observer(),
            north: self.north,
        }
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Number of objects with cached relations.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn compute_relations(&self, index: usize) -> Vec<SpatialRelation> {
        let ctx = self.context();
        let object = &self.objects[index];
        self.objects
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .flat_map(|(_, subject)| object.relate(subject, &ctx, false, false, false))
            .collect()
    }

    /// Relations of every other object to the object at `index`.
    pub fn relations_of(&mut self, index: usize) -> Result<&[SpatialRelation]> {
        self.object(index)?;
        if !self.cache.contains_key(&index) {
            let relations = self.compute_relations(index);
            log::debug!("{} relations for {}", relations.len(), self.objects[index].id);
            self.cache.insert(index, relations);
        }
        Ok(self
            .cache
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Relate all pairs, computing uncached objects in parallel.
    pub fn relate_all(&mut self) -> Vec<SpatialRelation> {
        let missing: Vec<usize> = (0..self.objects.len())
            .filter(|i| !self.cache.contains_key(i))
            .collect();
        let computed: Vec<(usize, Vec<SpatialRelation>)> = missing
            .par_iter()
            .map(|&i| (i, self.compute_relations(i)))
            .collect();
        log::debug!("related {} objects in parallel", computed.len());
        self.cache.extend(computed);
        (0..self.objects.len())
            .filter_map(|i| self.cache.get(&i))
            .flatten()
            .cloned()
            .collect()
    }

    /// Relations of the object at `index` with the given predicate.
    pub fn relations_with(
        &mut self,
        index: usize,
        predicate: SpatialPredicate,
    ) -> Result<Vec<SpatialRelation>> {
        Ok(self
            .relations_of(index)?
            .iter()
            .filter(|r| r.predicate == predicate)
            .cloned()
            .collect())
    }

    /// True if `subject <predicate> object` holds.
    pub fn does(&mut self, subject: usize, predicate: SpatialPredicate, object: usize) -> Result<bool> {
        let subject_id = self.object(subject)?.id.clone();
        Ok(self
            .relations_of(object)?
            .iter()
            .any(|r| r.predicate == predicate && r.subject == subject_id))
    }

    /// Value of `"<predicate>.<delta|angle>"` for the first relation with
    /// `subject` to any of `objects`, 0 if there is none.
    pub fn relation_value(&mut self, subject: usize, relval: &str, objects: &[usize]) -> f64 {
        let parts: Vec<&str> = relval.split('.').map(str::trim).collect();
        let [predicate, attribute] = parts.as_slice() else {
            return 0.0;
        };
        let predicate = SpatialPredicate::named(predicate);
        let subject_id = match self.object(subject) {
            Ok(obj) => obj.id.clone(),
            Err(_) => return 0.0,
        };
        for &index in objects {
            let Ok(relations) = self.relations_of(index) else {
                continue;
            };
            if let Some(relation) = relations
                .iter()
                .find(|r| r.predicate == predicate && r.subject == subject_id)
            {
                return match *attribute {
                    "delta" => relation.delta,
                    "angle" => relation.angle,
                    _ => 0.0,
                };
            }
        }
        0.0
    }

    /// Apply `;` separated adjust commands. Nothing changes if any command
    /// fails.
    pub fn adjust(&mut self, text: &str) -> Result<()> {
        let mut adjustment = self.adjustment;
        for setting in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            apply_setting(&mut adjustment, setting)?;
        }
        adjustment.validate()?;
        log::debug!("adjusted: {}", text);
        self.adjustment = adjustment;
        self.invalidate();
        Ok(())
    }

    /// Enable the categories named by substrings of `text`, disable the rest.
    pub fn deduce_categories(&mut self, text: &str) {
        self.deduce = PredicateCategories::from_names(text);
        self.invalidate();
    }

    /// Relation description using display names of the scene objects.
    pub fn describe(&self, relation: &SpatialRelation) -> String {
        let name = |id: &str| {
            self.object_with_id(id)
                .map(|obj| obj.display_name().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        relation.desc_with(&name(&relation.subject), &name(&relation.object))
    }
}

fn parse_number(setting: &str, value: Option<&str>) -> Result<f64> {
    let value = value.ok_or_else(|| SpatialError::InvalidNumber {
        setting: setting.to_string(),
        value: String::new(),
    })?;
    value.parse::<f64>().map_err(|_| SpatialError::InvalidNumber {
        setting: setting.to_string(),
        value: value.to_string(),
    })
}

fn apply_setting(adjustment: &mut Adjustment, setting: &str) -> Result<()> {
    let mut words = setting.split_whitespace();
    let first = words.next().unwrap_or_default();
    let second = words.next().unwrap_or_default();
    let number = words.next();
    let unknown = || SpatialError::UnknownSetting(setting.to_string());

    match (first, second) {
        ("max", "gap") => adjustment.max_gap = parse_number(setting, number)?,
        ("max", "angle") | ("max", "delta") => {
            adjustment.max_angle_delta = parse_number(setting, number)?
        }
        ("sector", "limit") => adjustment.sector_limit = parse_number(setting, number)?,
        ("sector", "factor") => adjustment.sector_factor = parse_number(setting, number)?,
        ("sector", schema) => {
            adjustment.sector_schema = SectorSchema::named(schema).ok_or_else(unknown)?;
            if number.is_some() {
                adjustment.sector_factor = parse_number(setting, number)?;
            }
        }
        ("nearby", "limit") => adjustment.nearby_limit = parse_number(setting, number)?,
        ("nearby", "factor") => adjustment.nearby_factor = parse_number(setting, number)?,
        ("nearby", schema) => {
            adjustment.nearby_schema = NearbySchema::named(schema).ok_or_else(unknown)?;
            if number.is_some() {
                adjustment.nearby_factor = parse_number(setting, number)?;
            }
        }
        ("long", "ratio") => adjustment.long_ratio = parse_number(setting, number)?,
        ("thin", "ratio") => adjustment.thin_ratio = parse_number(setting, number)?,
        _ => return Err(unknown()),
    }
    Ok(())
}

//! Mini-batching of glycan graphs.
//!
//! Turning an IUPAC-condensed string into a graph is the job of a
//! [`GlycanGraphEncoder`] supplied by the caller. This module only collates
//! encoded graphs into batches the way graph-learning loaders do: node labels
//! are concatenated, edge indices are offset by the number of nodes that came
//! before, and a `batch` vector records which graph each node belongs to.
use crate::error::{GlycoError, Result};
use candle_core::{Device, Tensor};
use rand::seq::SliceRandom;
use tracing::debug;

/// One encoded glycan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlycanGraph {
    /// Vocabulary index of each node.
    pub labels: Vec<u32>,
    /// Directed `(source, target)` pairs over local node ids.
    pub edges: Vec<(u32, u32)>,
}

impl GlycanGraph {
    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }
}

/// Glycan string → graph, given a vocabulary of glycoletters.
pub trait GlycanGraphEncoder {
    fn encode(&self, glycan: &str, libr: &[String]) -> Result<GlycanGraph>;
}

#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// Node labels, `u32 [nodes]`.
    pub labels: Tensor,
    /// Per-graph targets, `f32 [graphs]`.
    pub y: Tensor,
    /// `u32 [2, edges]` with batch-global node ids.
    pub edge_index: Tensor,
    /// Graph id of each node, `u32 [nodes]`.
    pub batch: Tensor,
    /// Optional per-graph feature, `f32 [graphs, features]`.
    pub extra: Option<Tensor>,
    pub num_graphs: usize,
}

impl GraphBatch {
    pub fn to_device(&self, device: &Device) -> Result<Self> {
        Ok(Self {
            labels: self.labels.to_device(device)?,
            y: self.y.to_device(device)?,
            edge_index: self.edge_index.to_device(device)?,
            batch: self.batch.to_device(device)?,
            extra: self
                .extra
                .as_ref()
                .map(|extra| extra.to_device(device))
                .transpose()?,
            num_graphs: self.num_graphs,
        })
    }

    /// Collates graphs (with their targets and optional extra features) into one
    /// host-side batch.
    pub fn collate(
        graphs: &[GlycanGraph],
        targets: &[f32],
        extra: Option<&[&[f32]]>,
    ) -> Result<Self> {
        check_len("targets", graphs.len(), targets.len())?;

        let num_nodes: usize = graphs.iter().map(GlycanGraph::num_nodes).sum();
        let num_edges: usize = graphs.iter().map(|g| g.edges.len()).sum();
        let mut labels = Vec::with_capacity(num_nodes);
        let mut batch = Vec::with_capacity(num_nodes);
        let mut sources = Vec::with_capacity(num_edges);
        let mut sinks = Vec::with_capacity(num_edges);

        let mut offset = 0u32;
        for (graph_id, graph) in graphs.iter().enumerate() {
            labels.extend_from_slice(&graph.labels);
            batch.extend(std::iter::repeat(graph_id as u32).take(graph.num_nodes()));
            for &(src, dst) in &graph.edges {
                sources.push(src + offset);
                sinks.push(dst + offset);
            }
            offset += graph.num_nodes() as u32;
        }
        sources.extend(sinks);

        let extra = match extra {
            Some(rows) => {
                check_len("extra features", graphs.len(), rows.len())?;
                let width = rows.first().map_or(0, |row| row.len());
                let mut flat = Vec::with_capacity(rows.len() * width);
                for row in rows {
                    check_len("extra feature width", width, row.len())?;
                    flat.extend_from_slice(row);
                }
                Some(Tensor::from_vec(flat, (rows.len(), width), &Device::Cpu)?)
            }
            None => None,
        };

        Ok(Self {
            labels: Tensor::from_vec(labels, num_nodes, &Device::Cpu)?,
            y: Tensor::from_vec(targets.to_vec(), targets.len(), &Device::Cpu)?,
            edge_index: Tensor::from_vec(sources, (2, num_edges), &Device::Cpu)?,
            batch: Tensor::from_vec(batch, num_nodes, &Device::Cpu)?,
            extra,
            num_graphs: graphs.len(),
        })
    }
}

/// Arguments for building mini-batches.
#[derive(Debug, Clone, Copy)]
pub struct LoaderRequest<'a> {
    pub glycans: &'a [String],
    pub targets: &'a [f32],
    /// Vocabulary of glycoletters; the loader's default when `None`.
    pub libr: Option<&'a [String]>,
    pub batch_size: usize,
    pub shuffle: bool,
    /// One feature vector per glycan, attached to the batch as `extra`.
    pub extra_feature: Option<&'a [Vec<f32>]>,
}

/// Produces mini-batches from glycans.
pub trait GlycanLoader {
    fn batches(&self, request: LoaderRequest<'_>) -> Result<Vec<GraphBatch>>;
}

/// [`GlycanLoader`] that encodes with `E` and collates in memory.
pub struct GraphDataLoader<E> {
    encoder: E,
    libr: Vec<String>,
}

impl<E: GlycanGraphEncoder> GraphDataLoader<E> {
    /// `libr` is the vocabulary used when a request does not carry one.
    pub fn new(encoder: E, libr: Vec<String>) -> Self {
        Self { encoder, libr }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn libr(&self) -> &[String] {
        &self.libr
    }
}

impl<E: GlycanGraphEncoder> GlycanLoader for GraphDataLoader<E> {
    fn batches(&self, request: LoaderRequest<'_>) -> Result<Vec<GraphBatch>> {
        if request.batch_size == 0 {
            return Err(GlycoError::InvalidBatchSize);
        }
        let n = request.glycans.len();
        check_len("targets", n, request.targets.len())?;
        if let Some(extra) = request.extra_feature {
            check_len("extra features", n, extra.len())?;
        }

        let libr = request.libr.unwrap_or(&self.libr);
        let graphs = request
            .glycans
            .iter()
            .map(|glycan| self.encoder.encode(glycan, libr))
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..n).collect();
        if request.shuffle {
            order.shuffle(&mut rand::thread_rng());
        }

        let batches = order
            .chunks(request.batch_size)
            .map(|chunk| {
                let graphs: Vec<GlycanGraph> = chunk.iter().map(|&i| graphs[i].clone()).collect();
                let targets: Vec<f32> = chunk.iter().map(|&i| request.targets[i]).collect();
                let extra: Option<Vec<&[f32]>> = request
                    .extra_feature
                    .map(|rows| chunk.iter().map(|&i| rows[i].as_slice()).collect());
                GraphBatch::collate(&graphs, &targets, extra.as_deref())
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(glycans = n, batches = batches.len(), "built glycan mini-batches");
        Ok(batches)
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(GlycoError::LengthMismatch {
            what,
            expected,
            got,
        })
    }
}
